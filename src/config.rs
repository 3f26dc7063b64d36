//! Layered service configuration.
//!
//! Values resolve in order: compiled defaults, then `config.toml` in the
//! working directory, then environment variables prefixed with `INVENTORY_`
//! (e.g. `INVENTORY_SERVICE_PORT=8080`, `INVENTORY_JWT_SECRET=...`).

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Tracing filter directive, e.g. `info` or `inventory_service=debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL understood by the `any` engine, e.g. `ws://localhost:8000`
    /// or `mem://` for an embedded in-memory instance.
    #[serde(default = "default_db_url")]
    pub url: String,
    #[serde(default = "default_db_name")]
    pub namespace: String,
    #[serde(default = "default_db_name")]
    pub database: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret. The default is only suitable for local runs.
    #[serde(default = "default_jwt_secret")]
    pub secret: String,
    #[serde(default = "default_jwt_expiry_secs")]
    pub expiry_secs: i64,
}

fn default_service_name() -> String {
    "inventory-service".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_db_url() -> String {
    "mem://".to_string()
}

fn default_db_name() -> String {
    "inventory".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_jwt_secret() -> String {
    "dev-secret-change-me".to_string()
}

fn default_jwt_expiry_secs() -> i64 {
    // 7 days
    7 * 24 * 60 * 60
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            port: default_port(),
            log_level: default_log_level(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            namespace: default_db_name(),
            database: default_db_name(),
            username: None,
            password: None,
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: default_jwt_secret(),
            expiry_secs: default_jwt_expiry_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            database: DatabaseConfig::default(),
            jwt: JwtConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("INVENTORY_").split("_"))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.service.port, 3000);
        assert_eq!(config.database.url, "mem://");
        assert_eq!(config.jwt.expiry_secs, 604_800);
    }

    #[test]
    fn toml_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [service]
                port = 8080

                [jwt]
                secret = "from-file"
                "#,
            )?;
            let config = Config::load().expect("config should load");
            assert_eq!(config.service.port, 8080);
            assert_eq!(config.jwt.secret, "from-file");
            // untouched sections keep their defaults
            assert_eq!(config.database.namespace, "inventory");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[service]\nport = 8080\n")?;
            jail.set_env("INVENTORY_SERVICE_PORT", "9090");
            let config = Config::load().expect("config should load");
            assert_eq!(config.service.port, 9090);
            Ok(())
        });
    }
}
