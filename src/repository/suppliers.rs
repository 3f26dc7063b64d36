use chrono::Utc;

use crate::db::Db;
use crate::models::{
    self, Supplier, SupplierContent, SupplierCreate, SupplierRecord, SupplierUpdate,
};

use super::error::{RepositoryError, RepositoryResult};

const TABLE: &str = "supplier";

#[derive(Clone)]
pub struct SupplierRepository {
    db: Db,
}

impl SupplierRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// All suppliers, alphabetical.
    pub async fn list(&self) -> RepositoryResult<Vec<Supplier>> {
        let mut response = self
            .db
            .query(format!("SELECT * FROM {TABLE} ORDER BY name ASC"))
            .await?;
        let records: Vec<SupplierRecord> = response.take(0)?;
        Ok(records.into_iter().map(Supplier::from).collect())
    }

    pub async fn get(&self, id: &str) -> RepositoryResult<Option<Supplier>> {
        let record: Option<SupplierRecord> = self.db.select((TABLE, id)).await?;
        Ok(record.map(Supplier::from))
    }

    pub async fn create(&self, payload: SupplierCreate) -> RepositoryResult<Supplier> {
        let now = Utc::now();
        let content = SupplierContent {
            name: payload.name.trim().to_string(),
            email: payload.email.map(|email| normalize_email(&email)),
            phone: payload.phone,
            created_at: now,
            updated_at: now,
        };
        validate_content(&content)?;

        let id = models::new_entity_id();
        let created: Option<SupplierRecord> =
            self.db.create((TABLE, id.as_str())).content(content).await?;
        created
            .map(Supplier::from)
            .ok_or_else(|| RepositoryError::database("create returned no record"))
    }

    /// Merge-style update, re-validated. `Ok(None)` when the supplier does
    /// not exist.
    pub async fn update(
        &self,
        id: &str,
        patch: SupplierUpdate,
    ) -> RepositoryResult<Option<Supplier>> {
        let existing: Option<SupplierRecord> = self.db.select((TABLE, id)).await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut content = existing.to_content();
        if let Some(name) = patch.name {
            content.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            content.email = Some(normalize_email(&email));
        }
        if let Some(phone) = patch.phone {
            content.phone = Some(phone);
        }
        content.updated_at = Utc::now();
        validate_content(&content)?;

        let updated: Option<SupplierRecord> =
            self.db.update((TABLE, id)).content(content).await?;
        Ok(updated.map(Supplier::from))
    }

    pub async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let deleted: Option<SupplierRecord> = self.db.delete((TABLE, id)).await?;
        Ok(deleted.is_some())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_content(content: &SupplierContent) -> RepositoryResult<()> {
    if content.name.trim().chars().count() < 2 {
        return Err(RepositoryError::validation(
            "supplier validation failed: name must have at least 2 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Info@Ceramiques.CAT "), "info@ceramiques.cat");
    }
}
