//! Inventory REST API over SurrealDB.
//!
//! Products, suppliers and categories exposed under `/api/v1`, with
//! JWT-protected product routes, declarative request validation and a
//! filter/sort/paginate product listing. Responses and error bodies follow
//! the service's established wire contract (`{"data", "page", ...}` list
//! envelopes, `{"error": ...}` failures).

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod query;
pub mod repository;
pub mod responses;
pub mod server;
pub mod state;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
