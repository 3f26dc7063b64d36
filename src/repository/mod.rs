//! Data access layer.
//!
//! One repository per entity, each owning its SurrealQL and its
//! stored-schema checks. Statements are parameterised; the only text ever
//! spliced into a statement is a sort field vetted against a whitelist.

pub mod categories;
pub mod error;
pub mod products;
pub mod suppliers;
pub mod users;

pub use categories::CategoryRepository;
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryResult};
pub use products::{ProductPage, ProductRepository};
pub use suppliers::SupplierRepository;
pub use users::UserRepository;
