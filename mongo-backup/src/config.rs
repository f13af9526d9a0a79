//! Configuration management for the backup service.
//!
//! Values come from the process environment (optionally seeded from a
//! `.env` file). The resulting [`Config`] is built once at start-up and
//! handed to the executor and router; nothing reads the environment later.

use crate::utils::errors::{BackupError, Result};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub mongo: MongoConfig,
    pub backup: BackupConfig,
    pub http: HttpConfig,
    pub log: LogConfig,
}

#[derive(Clone)]
pub struct MongoConfig {
    /// Connection string (`MONGODB_URI`)
    pub uri: String,

    /// Database to back up
    pub database: String,

    /// Server selection / connect timeout for the liveness check
    pub connect_timeout_secs: u64,
}

// The URI usually embeds credentials.
impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("uri", &"<redacted>")
            .field("database", &self.database)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Storage root for working directories and archives
    pub base_dir: PathBuf,

    /// Archives older than this are removed by the retention sweep
    pub retention_days: u32,

    /// Run the retention sweep after each archived run
    pub retention_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

// Default values
pub const DEFAULT_DATABASE: &str = "default_db";
const DEFAULT_BASE_DIR: &str = "backups";
const DEFAULT_RETENTION_DAYS: u32 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_LOG_LEVEL: &str = "info";

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let uri = get("MONGODB_URI").ok_or_else(|| {
            BackupError::Config("MONGODB_URI environment variable is required".into())
        })?;

        let port = match get("PORT") {
            Some(v) => parse_value("PORT", &v)?,
            None => parse_or("FLASK_PORT", get("FLASK_PORT"), DEFAULT_PORT)?,
        };

        let config = Config {
            mongo: MongoConfig {
                uri,
                database: get("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.into()),
                connect_timeout_secs: parse_or(
                    "MONGODB_CONNECT_TIMEOUT_SECS",
                    get("MONGODB_CONNECT_TIMEOUT_SECS"),
                    DEFAULT_CONNECT_TIMEOUT_SECS,
                )?,
            },
            backup: BackupConfig {
                base_dir: get("BACKUP_BASE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR)),
                retention_days: parse_or(
                    "BACKUP_RETENTION_DAYS",
                    get("BACKUP_RETENTION_DAYS"),
                    DEFAULT_RETENTION_DAYS,
                )?,
                retention_enabled: match get("BACKUP_RETENTION_ENABLED") {
                    Some(v) => parse_bool("BACKUP_RETENTION_ENABLED", &v)?,
                    None => false,
                },
            },
            http: HttpConfig { port },
            log: LogConfig {
                level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.into()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate required configuration.
    pub fn validate(&self) -> Result<()> {
        if self.mongo.uri.trim().is_empty() {
            return Err(BackupError::Config(
                "MONGODB_URI environment variable is required".into(),
            ));
        }
        if !self.mongo.uri.starts_with("mongodb://") && !self.mongo.uri.starts_with("mongodb+srv://")
        {
            return Err(BackupError::Config(
                "MONGODB_URI must start with mongodb:// or mongodb+srv://".into(),
            ));
        }
        if self.mongo.database.trim().is_empty() {
            return Err(BackupError::Config("MONGODB_DATABASE must not be empty".into()));
        }
        if self.mongo.connect_timeout_secs == 0 {
            return Err(BackupError::Config(
                "MONGODB_CONNECT_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| BackupError::Config(format!("{key} has an invalid value: {raw:?}")))
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(v) => parse_value(key, &v),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(BackupError::Config(format!("{key} has an invalid value: {raw:?}"))),
    }
}
