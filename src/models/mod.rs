//! Entity records and wire DTOs.
//!
//! Each entity has a `*Record` (as stored, with the SurrealDB record id), a
//! `*Content` (the id-less document written to the store) and a plain DTO
//! with a string id for the API surface. Wire names are camelCase.

pub mod category;
pub mod product;
pub mod supplier;
pub mod user;

pub use category::{Category, CategoryContent, CategoryCreate, CategoryRecord};
pub use product::{
    CategoryRef, Product, ProductContent, ProductCreate, ProductRecord, ProductUpdate, SupplierRef,
};
pub use supplier::{Supplier, SupplierContent, SupplierCreate, SupplierRecord, SupplierUpdate};
pub use user::{LoginRequest, RegisterRequest, RegisteredUser, UserContent, UserRecord};

use surrealdb::RecordId;

/// Mints a new entity id: 32 lowercase hex characters.
pub fn new_entity_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Whether `value` has the shape of an entity id.
pub fn is_entity_id(value: &str) -> bool {
    value.len() == 32 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Extracts the plain key from a record id (`product:abc123` -> `abc123`).
pub fn record_key(id: &RecordId) -> String {
    let raw = id.to_string();
    match raw.split_once(':') {
        Some((_, key)) => key.trim_matches(|c| c == '⟨' || c == '⟩').to_string(),
        None => raw,
    }
}

/// Fixed-width RFC 3339 (microsecond precision) timestamp serde.
///
/// Timestamps are stored as strings; a fixed width keeps their string
/// ordering consistent with chronological ordering for `ORDER BY`.
pub(crate) mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_are_32_hex() {
        let id = new_entity_id();
        assert!(is_entity_id(&id), "{id} should be a valid entity id");
        assert_ne!(id, new_entity_id());
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(!is_entity_id("abc"));
        assert!(!is_entity_id("g".repeat(32).as_str()));
        assert!(!is_entity_id("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn record_key_strips_table_prefix() {
        let id = RecordId::from_table_key("product", "00bf8f4d9f0a4cc8a9aa3d5bd86a6b90");
        assert_eq!(record_key(&id), "00bf8f4d9f0a4cc8a9aa3d5bd86a6b90");
    }

    #[test]
    fn timestamps_round_trip_with_fixed_width() {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Serialize};

        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "timestamp")]
            at: DateTime<Utc>,
        }

        let original = Wrapper { at: Utc::now() };
        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: Wrapper = serde_json::from_str(&encoded).unwrap();
        // microsecond precision survives the trip
        assert_eq!(
            original.at.timestamp_micros(),
            decoded.at.timestamp_micros()
        );
    }
}
