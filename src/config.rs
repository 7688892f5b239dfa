//! Configuration management for todo_panel.
//!
//! Configuration is read from environment variables (a `.env` file is loaded
//! first by the binary, if present):
//! - `CURRENT_ENV` - Required. One of `development`, `production`, `test`, `e2e`.
//!   Selects the database file.
//! - `DATA_DIR` - Optional. Directory holding the database file. Defaults to current directory.
//! - `TODO_STORE` - Optional. `sqlite` (default) or `memory`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `UNDO_WINDOW_MS` - Optional. How long a deletion can be undone. Defaults to `5000`.
//! - `RESTORED_NOTICE_MS` - Optional. Display time of the "restored" notice. Defaults to `500`.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::api::todo_store::TodoStoreType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Named deployment environment. Each one owns a separate database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
    Test,
    E2e,
}

impl AppEnv {
    pub const ALL: [AppEnv; 4] = [
        AppEnv::Development,
        AppEnv::Production,
        AppEnv::Test,
        AppEnv::E2e,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnv::Development => "development",
            AppEnv::Production => "production",
            AppEnv::Test => "test",
            AppEnv::E2e => "e2e",
        }
    }

    /// Database file name used by this environment.
    pub fn database_file(&self) -> &'static str {
        match self {
            AppEnv::Development => "dev.db.sqlite3",
            AppEnv::Production => "prod.db.sqlite3",
            AppEnv::Test => ".int.test.db.sqlite3",
            AppEnv::E2e => "e2e.test.db.sqlite3",
        }
    }

    /// Parse an environment name. Names are matched exactly.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == value)
            .ok_or_else(|| {
                let accepted: Vec<&str> = Self::ALL.iter().map(|env| env.as_str()).collect();
                ConfigError::InvalidValue(
                    "CURRENT_ENV".to_string(),
                    format!("'{}'. Must be one of: {}", value, accepted.join(", ")),
                )
            })
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Active environment
    pub env: AppEnv,

    /// Directory holding the database file
    pub data_dir: PathBuf,

    /// Storage backend
    pub store_type: TodoStoreType,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// How long a deleted task can be restored from the board
    pub undo_window: Duration,

    /// Display hint for the "restored" notice
    pub restored_notice: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `CURRENT_ENV` is not set and
    /// `ConfigError::InvalidValue` if it names an unknown environment or a
    /// numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let current_env = std::env::var("CURRENT_ENV")
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("CURRENT_ENV".to_string()))?;
        let env = AppEnv::parse(&current_env)?;

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let store_type = std::env::var("TODO_STORE")
            .map(|value| TodoStoreType::from_str(&value))
            .unwrap_or_default();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let undo_window = Duration::from_millis(parse_millis("UNDO_WINDOW_MS", 5000)?);
        let restored_notice = Duration::from_millis(parse_millis("RESTORED_NOTICE_MS", 500)?);

        Ok(Self {
            env,
            data_dir,
            store_type,
            host,
            port,
            undo_window,
            restored_notice,
        })
    }

    /// Create a config for the given environment with default values (useful for testing).
    pub fn new(env: AppEnv, data_dir: PathBuf) -> Self {
        Self {
            env,
            data_dir,
            store_type: TodoStoreType::default(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            undo_window: Duration::from_millis(5000),
            restored_notice: Duration::from_millis(500),
        }
    }

    /// Full path of the database file for the active environment.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(self.env.database_file())
    }
}

fn parse_millis(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_known_environment() {
        for env in AppEnv::ALL {
            assert_eq!(AppEnv::parse(env.as_str()).unwrap(), env);
        }
    }

    #[test]
    fn parse_rejects_unknown_environment() {
        let err = AppEnv::parse("staging").unwrap_err();
        match err {
            ConfigError::InvalidValue(name, message) => {
                assert_eq!(name, "CURRENT_ENV");
                assert!(message.contains("'staging'"));
                assert!(message.contains("development, production, test, e2e"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!(AppEnv::parse("Production").is_err());
    }

    #[test]
    fn environments_use_distinct_database_files() {
        let mut files: Vec<&str> = AppEnv::ALL.iter().map(|env| env.database_file()).collect();
        files.sort();
        files.dedup();
        assert_eq!(files.len(), AppEnv::ALL.len());
    }

    #[test]
    fn database_path_joins_data_dir() {
        let config = Config::new(AppEnv::Test, PathBuf::from("/var/lib/todo"));
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/todo/.int.test.db.sqlite3")
        );
    }
}
