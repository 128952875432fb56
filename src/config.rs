use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Mongo { uri: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_name: String,
    /// Project used by routes that carry no project segment.
    pub default_project: String,
    pub store_timeout: Duration,
    pub bind_addr: String,
    pub frontend_origin: String,
    /// Log request payloads at debug level.
    pub debug_log: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("mongo") => StoreBackend::Mongo {
                uri: lookup("MONGO_URI").ok_or(ConfigError::Missing("MONGO_URI"))?,
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let store_timeout = match lookup("STORE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid {
                    var: "STORE_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => Duration::from_secs(5),
        };

        let debug_log = lookup("DEBUG")
            .map(|raw| raw == "true")
            .unwrap_or(false);

        Ok(Self {
            store_backend,
            database_name: lookup("DATABASE_NAME").unwrap_or_else(|| "issue_tracker".to_string()),
            default_project: lookup("DEFAULT_PROJECT").unwrap_or_else(|| "apitest".to_string()),
            store_timeout,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            frontend_origin: lookup("FRONTEND_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            debug_log,
        })
    }
}
