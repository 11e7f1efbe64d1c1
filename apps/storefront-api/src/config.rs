//! Storefront API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                  | Default            |
//! |---------------------------|--------------------|
//! | `APP_ENV`                 | `production`       |
//! | `STOREFRONT_DB_PATH`      | `./storefront.db`  |
//! | `DB_MAX_CONNECTIONS`      | `10`               |
//! | `DB_CONNECT_TIMEOUT_SECS` | `30`               |
//! | `STARTUP_MAX_RETRIES`     | `5`                |
//! | `STARTUP_BASE_DELAY_SECS` | `2`                |

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use storefront_db::{DbConfig, RetryPolicy, StartupMode};

/// Storefront API configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Development recreates and reseeds the schema on every start
    pub mode: StartupMode,

    /// SQLite database file (`:memory:` for an in-memory database)
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a read waits for a pooled connection
    pub connect_timeout: Duration,

    /// Startup retry/backoff
    pub retry: RetryPolicy,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup("APP_ENV") {
            Some(value) => parse_mode(&value)?,
            None => StartupMode::Production,
        };

        let database_path = lookup("STOREFRONT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./storefront.db"));

        let max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DB_MAX_CONNECTIONS".to_string(),
                value: "0".to_string(),
            });
        }

        let connect_timeout = Duration::from_secs(parse_or(&lookup, "DB_CONNECT_TIMEOUT_SECS", 30)?);

        let retry = RetryPolicy {
            max_retries: parse_or(&lookup, "STARTUP_MAX_RETRIES", 5)?,
            base_delay: Duration::from_secs(parse_or(&lookup, "STARTUP_BASE_DELAY_SECS", 2)?),
        };

        Ok(AppConfig {
            mode,
            database_path,
            max_connections,
            connect_timeout,
            retry,
        })
    }

    /// Pool settings for this configuration.
    pub fn db_config(&self) -> DbConfig {
        if self.database_path == Path::new(":memory:") {
            return DbConfig::in_memory().connect_timeout(self.connect_timeout);
        }

        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .connect_timeout(self.connect_timeout)
            .run_migrations(false)
    }
}

fn parse_mode(value: &str) -> Result<StartupMode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(StartupMode::Development),
        "production" | "prod" => Ok(StartupMode::Production),
        _ => Err(ConfigError::InvalidValue {
            name: "APP_ENV".to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },
}
