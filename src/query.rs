//! Product list query building.
//!
//! Raw query-string parameters arrive as optional strings and are folded
//! into a typed [`ProductQuery`]: a filter where every constraint is
//! optional, a sort specification and clamped pagination. Absent or
//! unusable `page`/`limit` values fall back rather than fail; a present but
//! non-numeric price bound is a validation error.

use serde::Deserialize;

use crate::error::Error;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Query string of `GET /products`, everything optional and untyped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default)]
    pub min_price: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_surql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One `field[:direction]` pair of the sort spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            order: SortOrder::Desc,
        }
    }
}

/// The optional constraints of a product listing. Absent means "no
/// constraint", never "constraint with a default value".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against name or sku.
    pub search: Option<String>,
    /// Tri-state: `Some(true)` only active, `Some(false)` only inactive,
    /// `None` both.
    pub active: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    pub sort: Vec<SortKey>,
    pub page: u32,
    pub limit: u32,
}

impl ProductQuery {
    /// Records skipped before the requested page starts.
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn from_params(params: RawListParams) -> Result<Self, Error> {
        let page = params
            .page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);

        let limit = params
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);

        let filter = ProductFilter {
            search: params.q.filter(|raw| !raw.is_empty()),
            active: params.active.map(|raw| raw == "true"),
            min_price: parse_price(params.min_price, "minPrice")?,
            max_price: parse_price(params.max_price, "maxPrice")?,
            category: params.category.filter(|raw| !raw.is_empty()),
        };

        Ok(Self {
            filter,
            sort: parse_sort(params.sort.as_deref()),
            page,
            limit,
        })
    }
}

fn parse_price(raw: Option<String>, param: &str) -> Result<Option<f64>, Error> {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(Some)
        .ok_or_else(|| Error::Validation(format!("El parámetro {param} debe ser un número")))
}

/// Parses `sort=-price,name` into keys; a `-` prefix means descending.
/// Empty segments are dropped; no usable key means the newest-first default.
fn parse_sort(raw: Option<&str>) -> Vec<SortKey> {
    let keys: Vec<SortKey> = raw
        .unwrap_or_default()
        .split(',')
        .filter_map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() || segment == "-" {
                return None;
            }
            Some(match segment.strip_prefix('-') {
                Some(field) => SortKey::desc(field),
                None => SortKey::asc(segment),
            })
        })
        .collect();

    if keys.is_empty() {
        vec![SortKey::desc("createdAt")]
    } else {
        keys
    }
}
