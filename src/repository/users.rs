use chrono::Utc;

use crate::db::Db;
use crate::models::{self, UserContent, UserRecord};

use super::error::{RepositoryError, RepositoryResult};

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    db: Db,
}

impl UserRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Registers an account. The email is the login key and must be unique;
    /// a lookup guards the common case and the unique index on `user.email`
    /// backs it up.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> RepositoryResult<UserRecord> {
        let email = email.trim().to_lowercase();
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepositoryError::duplicate("Email duplicat"));
        }

        let content = UserContent {
            name: name.trim().to_string(),
            email,
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        let id = models::new_entity_id();
        let created: Option<UserRecord> = self
            .db
            .create((TABLE, id.as_str()))
            .content(content)
            .await
            .map_err(|_| RepositoryError::duplicate("Email duplicat"))?;
        created.ok_or_else(|| RepositoryError::database("create returned no record"))
    }

    pub async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>> {
        let mut response = self
            .db
            .query(format!("SELECT * FROM {TABLE} WHERE email = $email"))
            .bind(("email", email.trim().to_lowercase()))
            .await?;
        let records: Vec<UserRecord> = response.take(0)?;
        Ok(records.into_iter().next())
    }
}
