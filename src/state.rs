//! Shared application state.

use std::sync::Arc;

use crate::auth::{PasswordService, TokenService};
use crate::config::Config;
use crate::db::{self, Db};
use crate::error::Result;
use crate::repository::{
    CategoryRepository, ProductRepository, SupplierRepository, UserRepository,
};

/// Cloned into every handler. All members are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Db,
    pub tokens: TokenService,
    pub passwords: PasswordService,
}

impl AppState {
    /// Connects to the store, applies the schema and wires the services.
    pub async fn build(config: Config) -> Result<Self> {
        let db = db::connect(&config.database).await?;
        db::define_schema(&db).await?;
        let tokens = TokenService::new(&config.jwt);
        Ok(Self {
            config: Arc::new(config),
            db,
            tokens,
            passwords: PasswordService,
        })
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.db.clone())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.db.clone())
    }

    pub fn suppliers(&self) -> SupplierRepository {
        SupplierRepository::new(self.db.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }
}
