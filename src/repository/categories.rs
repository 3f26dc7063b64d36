use chrono::Utc;

use crate::db::Db;
use crate::models::{self, Category, CategoryContent, CategoryCreate, CategoryRecord};

use super::error::{RepositoryError, RepositoryResult};

const TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    db: Db,
}

impl CategoryRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// All categories, alphabetical.
    pub async fn list(&self) -> RepositoryResult<Vec<Category>> {
        let mut response = self
            .db
            .query(format!("SELECT * FROM {TABLE} ORDER BY name ASC"))
            .await?;
        let records: Vec<CategoryRecord> = response.take(0)?;
        Ok(records.into_iter().map(Category::from).collect())
    }

    pub async fn create(&self, payload: CategoryCreate) -> RepositoryResult<Category> {
        let now = Utc::now();
        let content = CategoryContent {
            name: payload.name.trim().to_string(),
            created_at: now,
            updated_at: now,
        };
        if content.name.chars().count() < 2 {
            return Err(RepositoryError::validation(
                "category validation failed: name must have at least 2 characters",
            ));
        }

        let id = models::new_entity_id();
        let created: Option<CategoryRecord> =
            self.db.create((TABLE, id.as_str())).content(content).await?;
        created
            .map(Category::from)
            .ok_or_else(|| RepositoryError::database("create returned no record"))
    }
}
