//! Structured repository errors.
//!
//! Repositories report failures with a kind the HTTP layer can map to a
//! status code without inspecting backend error strings.

use std::fmt;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryErrorKind {
    /// Target record does not exist.
    NotFound,
    /// A uniqueness constraint would be violated.
    Duplicate,
    /// The document failed the entity's stored-schema constraints.
    Validation,
    /// Backend failure (connection, query, serialization).
    Database,
}

#[derive(Debug, Clone)]
pub struct RepositoryError {
    pub kind: RepositoryErrorKind,
    pub message: String,
    pub entity: Option<&'static str>,
}

impl RepositoryError {
    pub fn not_found(entity: &'static str) -> Self {
        Self {
            kind: RepositoryErrorKind::NotFound,
            message: format!("{entity} not found"),
            entity: Some(entity),
        }
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self {
            kind: RepositoryErrorKind::Duplicate,
            message: message.into(),
            entity: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: RepositoryErrorKind::Validation,
            message: message.into(),
            entity: None,
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self {
            kind: RepositoryErrorKind::Database,
            message: message.into(),
            entity: None,
        }
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entity {
            Some(entity) => write!(f, "{:?} error on {}: {}", self.kind, entity, self.message),
            None => write!(f, "{:?} error: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for RepositoryError {}

impl From<surrealdb::Error> for RepositoryError {
    fn from(err: surrealdb::Error) -> Self {
        Self::database(err.to_string())
    }
}
