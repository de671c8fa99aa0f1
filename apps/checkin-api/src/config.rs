//! Application configuration loaded from environment variables.
//!
//! Loading is fail-fast: required variables must be present and every
//! value must parse, or the application exits with a clear error message.

use std::env;
use std::time::Duration;

use checkin_db::DEFAULT_MAX_CONNECTIONS;
use checkin_directory_sync::DEFAULT_PHOTO_CONCURRENCY;
use checkin_graph::{GraphConfig, GraphError, DEFAULT_GRAPH_BASE_URL, DEFAULT_TIMEOUT_SECS};
use thiserror::Error;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,checkin=debug";

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Invalid Graph configuration: {0}")]
    Graph(#[from] GraphError),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub graph: GraphConfig,
    /// Cap on concurrent avatar fetches per photo sync.
    pub photo_sync_concurrency: usize,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port: u16 = parse_or(&lookup, "PORT", 8080)?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "Must be between 1 and 65535".to_string(),
            });
        }

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let graph_base_url =
            lookup("GRAPH_BASE_URL").unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string());
        let graph_timeout_secs: u64 = parse_or(&lookup, "GRAPH_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let graph = GraphConfig::builder()
            .base_url(graph_base_url)
            .timeout(Duration::from_secs(graph_timeout_secs))
            .build()?;

        let photo_sync_concurrency: usize =
            parse_or(&lookup, "PHOTO_SYNC_CONCURRENCY", DEFAULT_PHOTO_CONCURRENCY)?;
        if photo_sync_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PHOTO_SYNC_CONCURRENCY".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        let db_max_connections: u32 =
            parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                var: "DB_MAX_CONNECTIONS".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        Ok(Self {
            database_url,
            db_max_connections,
            host,
            port,
            rust_log,
            graph,
            photo_sync_concurrency,
        })
    }

    /// Get the socket address to bind to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: var.to_string(),
            message: e.to_string(),
        }),
    }
}
