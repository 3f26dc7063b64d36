//! SurrealDB connection management.
//!
//! Protocol is selected at runtime from the URL scheme:
//! - `ws://` / `wss://` - WebSocket connections
//! - `http://` / `https://` - HTTP connections
//! - `mem://` - embedded in-memory database (used by the test suite)

use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

/// Database handle using the `any` engine for runtime protocol selection.
pub type Db = surrealdb::Surreal<surrealdb::engine::any::Any>;

/// Connects with exponential-backoff retries, then selects the configured
/// namespace and database.
pub async fn connect(config: &DatabaseConfig) -> Result<Db> {
    let mut attempt = 0;
    let base_delay = Duration::from_secs(config.retry_delay_secs);

    loop {
        match try_connect(config).await {
            Ok(db) => {
                tracing::info!(
                    url = %sanitize_url(&config.url),
                    namespace = %config.namespace,
                    database = %config.database,
                    attempts = attempt + 1,
                    "database connected"
                );
                return Ok(db);
            }
            Err(err) => {
                attempt += 1;
                if attempt > config.max_retries {
                    tracing::error!(
                        attempts = attempt,
                        error = %err,
                        "giving up on database connection"
                    );
                    return Err(err);
                }

                let delay = base_delay * 2_u32.pow(attempt.saturating_sub(1));
                tracing::warn!(
                    attempt,
                    error = %err,
                    retry_in = ?delay,
                    "database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn try_connect(config: &DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(&config.url)
        .await
        .map_err(|err| {
            Error::Internal(format!(
                "failed to connect to database at '{}': {err}",
                sanitize_url(&config.url)
            ))
        })?;

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        db.signin(surrealdb::opt::auth::Root { username, password })
            .await
            .map_err(|err| Error::Internal(format!("database authentication failed: {err}")))?;
    }

    db.use_ns(&config.namespace)
        .use_db(&config.database)
        .await
        .map_err(|err| {
            Error::Internal(format!(
                "failed to select namespace '{}' / database '{}': {err}",
                config.namespace, config.database
            ))
        })?;

    Ok(db)
}

/// Tables and indexes the service expects. Idempotent.
///
/// Product sku has no store-level unique index: most products carry no sku
/// and the index would treat every absent value as the same key. The
/// repository enforces sku uniqueness with a lookup before each write.
pub async fn define_schema(db: &Db) -> Result<()> {
    db.query(
        "DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
         DEFINE TABLE IF NOT EXISTS category SCHEMALESS;
         DEFINE TABLE IF NOT EXISTS supplier SCHEMALESS;
         DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
         DEFINE INDEX IF NOT EXISTS user_email_idx ON TABLE user FIELDS email UNIQUE;",
    )
    .await?
    .check()?;
    Ok(())
}

/// Strips credentials from a connection URL before it reaches the logs.
pub fn sanitize_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(scheme_end) = url.find("://") {
            let scheme = &url[..=scheme_end + 2];
            let after_at = &url[at_pos..];
            return format!("{scheme}***{after_at}");
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_url_without_credentials() {
        assert_eq!(sanitize_url("ws://localhost:8000"), "ws://localhost:8000");
        assert_eq!(sanitize_url("mem://"), "mem://");
    }

    #[test]
    fn sanitize_url_hides_credentials() {
        let sanitized = sanitize_url("ws://user:pass@localhost:8000");
        assert!(sanitized.contains("***"));
        assert!(sanitized.contains("localhost:8000"));
        assert!(!sanitized.contains("user"));
        assert!(!sanitized.contains("pass"));
    }

    #[tokio::test]
    async fn mem_connection_and_schema() {
        let config = DatabaseConfig {
            url: "mem://".to_string(),
            namespace: "test".to_string(),
            database: "test".to_string(),
            max_retries: 0,
            ..Default::default()
        };

        let db = connect(&config).await.expect("mem:// should connect");
        define_schema(&db).await.expect("schema should apply");
    }
}
