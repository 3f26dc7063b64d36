//! Declarative request validation.
//!
//! Each mutating endpoint owns a rule set evaluated against the raw JSON
//! body before deserialization. Evaluation stops at the first failing rule
//! and the handler answers 422 with `{"message": "Error de validación",
//! "errors": [{"field", "message"}]}`. Optional fields are only checked
//! when present and non-null.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models;

/// Uppercase alphanumerics and dashes, e.g. `TAS-001`.
pub static SKU_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9-]+$").expect("pattern is valid"));

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("pattern is valid"));

/// A single rejected field, as rendered in the error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
enum RuleKind {
    /// A string whose trimmed length is at least `min_chars`.
    Str { min_chars: usize },
    /// A number greater than or equal to `min`.
    Float { min: f64 },
    /// An integer greater than or equal to `min`.
    Int { min: i64 },
    /// A string matching `pattern`.
    Pattern(&'static Lazy<Regex>),
    Bool,
    /// A string shaped like an entity id.
    Reference,
}

#[derive(Debug, Clone)]
struct Rule {
    field: &'static str,
    required: bool,
    kind: RuleKind,
    message: &'static str,
}

impl Rule {
    fn check(&self, body: &Value) -> Result<(), FieldError> {
        let value = match body.get(self.field) {
            Some(value) if !value.is_null() => value,
            _ => {
                if self.required {
                    return Err(FieldError::new(self.field, self.message));
                }
                return Ok(());
            }
        };

        let ok = match &self.kind {
            RuleKind::Str { min_chars } => value
                .as_str()
                .is_some_and(|raw| raw.trim().chars().count() >= *min_chars),
            RuleKind::Float { min } => value.as_f64().is_some_and(|n| n.is_finite() && n >= *min),
            RuleKind::Int { min } => value.as_i64().is_some_and(|n| n >= *min),
            RuleKind::Pattern(pattern) => value.as_str().is_some_and(|raw| pattern.is_match(raw)),
            RuleKind::Bool => value.is_boolean(),
            RuleKind::Reference => value.as_str().is_some_and(models::is_entity_id),
        };

        if ok {
            Ok(())
        } else {
            Err(FieldError::new(self.field, self.message))
        }
    }
}

/// The ordered rules of one endpoint.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// First failure wins.
    pub fn check(&self, body: &Value) -> Result<(), FieldError> {
        for rule in &self.rules {
            rule.check(body)?;
        }
        Ok(())
    }
}

pub fn product_create() -> RuleSet {
    RuleSet {
        rules: vec![
            Rule {
                field: "name",
                required: true,
                kind: RuleKind::Str { min_chars: 3 },
                message: "El nombre debe tener mínimo 3 caracteres",
            },
            Rule {
                field: "price",
                required: true,
                kind: RuleKind::Float { min: 0.0 },
                message: "El precio debe ser un número ≥ 0",
            },
            Rule {
                field: "stock",
                required: true,
                kind: RuleKind::Int { min: 0 },
                message: "El stock debe ser un entero ≥ 0",
            },
            Rule {
                field: "sku",
                required: false,
                kind: RuleKind::Pattern(&SKU_PATTERN),
                message: "SKU solo puede contener A-Z, 0-9 y guiones",
            },
            Rule {
                field: "active",
                required: false,
                kind: RuleKind::Bool,
                message: "Active debe ser true o false",
            },
            Rule {
                field: "supplierId",
                required: false,
                kind: RuleKind::Reference,
                message: "Supplier no válido",
            },
        ],
    }
}

pub fn product_update() -> RuleSet {
    let mut set = product_create();
    for rule in &mut set.rules {
        rule.required = false;
    }
    set
}

pub fn supplier_create() -> RuleSet {
    RuleSet {
        rules: vec![
            Rule {
                field: "name",
                required: true,
                kind: RuleKind::Str { min_chars: 2 },
                message: "El nombre debe tener mínimo 2 caracteres",
            },
            Rule {
                field: "email",
                required: false,
                kind: RuleKind::Pattern(&EMAIL_PATTERN),
                message: "El email no es válido",
            },
            Rule {
                field: "phone",
                required: false,
                kind: RuleKind::Str { min_chars: 0 },
                message: "El teléfono debe ser texto",
            },
        ],
    }
}

pub fn supplier_update() -> RuleSet {
    let mut set = supplier_create();
    for rule in &mut set.rules {
        rule.required = false;
    }
    set
}

pub fn category_create() -> RuleSet {
    RuleSet {
        rules: vec![Rule {
            field: "name",
            required: true,
            kind: RuleKind::Str { min_chars: 2 },
            message: "El nombre debe tener mínimo 2 caracteres",
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_product_passes() {
        let body = json!({
            "name": "Tassa",
            "sku": "TAS-001",
            "price": 5.5,
            "stock": 10,
            "active": true,
        });
        assert!(product_create().check(&body).is_ok());
    }

    #[test]
    fn first_failure_wins() {
        let body = json!({ "name": "", "price": -1 });
        let err = product_create().check(&body).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.message, "El nombre debe tener mínimo 3 caracteres");
    }

    #[test]
    fn price_is_checked_before_sku() {
        // both fields are bad; the declaration order decides which one is
        // reported, and price comes first
        let body = json!({ "name": "Tassa", "sku": "bad sku", "price": -1, "stock": 1 });
        let err = product_create().check(&body).unwrap_err();
        assert_eq!(err.field, "price");
        assert_eq!(err.message, "El precio debe ser un número ≥ 0");
    }

    #[test]
    fn missing_required_field_fails() {
        let body = json!({ "name": "Tassa", "stock": 1 });
        let err = product_create().check(&body).unwrap_err();
        assert_eq!(err.field, "price");
    }

    #[test]
    fn whitespace_name_is_too_short() {
        let body = json!({ "name": "  a  ", "price": 1, "stock": 1 });
        let err = product_create().check(&body).unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn negative_price_rejected() {
        let body = json!({ "name": "Tassa", "price": -0.5, "stock": 1 });
        let err = product_create().check(&body).unwrap_err();
        assert_eq!(err.field, "price");
    }

    #[test]
    fn fractional_stock_rejected() {
        let body = json!({ "name": "Tassa", "price": 1, "stock": 1.5 });
        let err = product_create().check(&body).unwrap_err();
        assert_eq!(err.field, "stock");
    }

    #[test]
    fn lowercase_sku_rejected() {
        let body = json!({ "name": "Tassa", "sku": "tas-001", "price": 1, "stock": 1 });
        let err = product_create().check(&body).unwrap_err();
        assert_eq!(err.field, "sku");
    }

    #[test]
    fn null_optional_field_is_absent() {
        let body = json!({ "name": "Tassa", "sku": null, "price": 1, "stock": 1 });
        assert!(product_create().check(&body).is_ok());
    }

    #[test]
    fn update_rules_allow_partial_bodies() {
        assert!(product_update().check(&json!({ "price": 9.9 })).is_ok());
        assert!(product_update().check(&json!({})).is_ok());
        let err = product_update()
            .check(&json!({ "stock": -2 }))
            .unwrap_err();
        assert_eq!(err.field, "stock");
    }

    #[test]
    fn supplier_reference_must_be_entity_id() {
        let body = json!({
            "name": "Tassa",
            "price": 1,
            "stock": 1,
            "supplierId": "not-an-id",
        });
        let err = product_create().check(&body).unwrap_err();
        assert_eq!(err.field, "supplierId");

        let body = json!({
            "name": "Tassa",
            "price": 1,
            "stock": 1,
            "supplierId": "0".repeat(32),
        });
        assert!(product_create().check(&body).is_ok());
    }

    #[test]
    fn supplier_rules_check_email_shape() {
        let err = supplier_create()
            .check(&json!({ "name": "Ceràmiques SA", "email": "not-an-email" }))
            .unwrap_err();
        assert_eq!(err.field, "email");

        assert!(supplier_create()
            .check(&json!({ "name": "Ceràmiques SA", "email": "info@ceramiques.cat" }))
            .is_ok());
    }

    #[test]
    fn category_requires_name() {
        let err = category_create().check(&json!({})).unwrap_err();
        assert_eq!(err.field, "name");
        assert!(category_create().check(&json!({ "name": "Cuina" })).is_ok());
    }
}
