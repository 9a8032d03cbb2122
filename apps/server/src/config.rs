//! # Server Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     OAXACA_PORT=8080                                                   │
//! │     OAXACA_WAITER_MODE=batch                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or OAXACA_CONFIG, or                              │
//! │     ~/.config/oaxaca/server.toml (Linux)                               │
//! │     ~/Library/Application Support/com.oaxaca.oaxaca/server.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [http]
//! bind_addr = "0.0.0.0"
//! port = 3000
//!
//! [database]
//! path = "./oaxaca.db"
//! max_connections = 8
//!
//! [floor]
//! table_count = 12
//!
//! [allocation]
//! waiter_mode = "single"   # single | batch
//! max_claim_attempts = 8
//! dispatch_interval_secs = 5   # 0 disables the dispatcher
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use oaxaca_core::validation::validate_table_count;
use oaxaca_core::{ValidationError, WaiterAssignmentMode, DEFAULT_TABLE_COUNT};
use oaxaca_db::{DbConfig, DEFAULT_MAX_CLAIM_ATTEMPTS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "OAXACA_CONFIG";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Sections
// =============================================================================

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl HttpSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file, created if missing.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./oaxaca.db")
}

fn default_max_connections() -> u32 {
    8
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// The physical floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorSettings {
    /// Tables `1..=table_count` are provisioned at startup.
    #[serde(default = "default_table_count")]
    pub table_count: u32,
}

fn default_table_count() -> u32 {
    DEFAULT_TABLE_COUNT
}

impl Default for FloorSettings {
    fn default() -> Self {
        FloorSettings {
            table_count: default_table_count(),
        }
    }
}

/// Allocator policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationSettings {
    #[serde(default)]
    pub waiter_mode: WaiterAssignmentMode,

    #[serde(default = "default_max_claim_attempts")]
    pub max_claim_attempts: u32,

    /// Seconds between waiter dispatcher passes. 0 disables the dispatcher.
    #[serde(default = "default_dispatch_interval")]
    pub dispatch_interval_secs: u64,
}

fn default_max_claim_attempts() -> u32 {
    DEFAULT_MAX_CLAIM_ATTEMPTS
}

fn default_dispatch_interval() -> u64 {
    5
}

impl Default for AllocationSettings {
    fn default() -> Self {
        AllocationSettings {
            waiter_mode: WaiterAssignmentMode::default(),
            max_claim_attempts: default_max_claim_attempts(),
            dispatch_interval_secs: default_dispatch_interval(),
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub floor: FloorSettings,

    #[serde(default)]
    pub allocation: AllocationSettings,
}

impl ServerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file: `config_path`, else `OAXACA_CONFIG`, else the platform
    ///    config dir (skipped silently if absent)
    /// 3. `OAXACA_*` environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let explicit = config_path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading server config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `OAXACA_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("OAXACA_BIND_ADDR") {
            self.http.bind_addr = addr;
        }
        if let Some(port) = lookup("OAXACA_PORT") {
            self.http.port = parse_env("OAXACA_PORT", &port)?;
            debug!(port = self.http.port, "Overriding port from environment");
        }
        if let Some(path) = lookup("OAXACA_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(max) = lookup("OAXACA_MAX_CONNECTIONS") {
            self.database.max_connections = parse_env("OAXACA_MAX_CONNECTIONS", &max)?;
        }
        if let Some(count) = lookup("OAXACA_TABLE_COUNT") {
            self.floor.table_count = parse_env("OAXACA_TABLE_COUNT", &count)?;
        }
        if let Some(mode) = lookup("OAXACA_WAITER_MODE") {
            self.allocation.waiter_mode = parse_env("OAXACA_WAITER_MODE", &mode)?;
            debug!(mode = %mode, "Overriding waiter mode from environment");
        }
        if let Some(attempts) = lookup("OAXACA_MAX_CLAIM_ATTEMPTS") {
            self.allocation.max_claim_attempts = parse_env("OAXACA_MAX_CLAIM_ATTEMPTS", &attempts)?;
        }
        if let Some(secs) = lookup("OAXACA_DISPATCH_INTERVAL_SECS") {
            self.allocation.dispatch_interval_secs =
                parse_env("OAXACA_DISPATCH_INTERVAL_SECS", &secs)?;
        }
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.bind_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("http.bind_addr must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        if self.allocation.max_claim_attempts == 0 {
            return Err(ConfigError::Invalid(
                "allocation.max_claim_attempts must be greater than 0".into(),
            ));
        }
        validate_table_count(self.floor.table_count)?;
        Ok(())
    }

    /// Pool settings for [`oaxaca_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    /// Dispatcher period, `None` when disabled.
    pub fn dispatch_interval(&self) -> Option<Duration> {
        match self.allocation.dispatch_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "oaxaca", "oaxaca")
            .map(|dirs| dirs.config_dir().join("server.toml"))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.http.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.floor.table_count, DEFAULT_TABLE_COUNT);
        assert_eq!(config.allocation.waiter_mode, WaiterAssignmentMode::Single);
        assert_eq!(config.dispatch_interval(), Some(Duration::from_secs(5)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [floor]
            table_count = 20

            [allocation]
            waiter_mode = "batch"
            dispatch_interval_secs = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.floor.table_count, 20);
        assert_eq!(config.allocation.waiter_mode, WaiterAssignmentMode::Batch);
        assert_eq!(config.dispatch_interval(), None);
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.allocation.max_claim_attempts, DEFAULT_MAX_CLAIM_ATTEMPTS);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 4000\n[database]\npath = \"/tmp/floor.db\"").unwrap();

        let mut config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.http.port, 4000);

        config
            .apply_overrides(env(&[
                ("OAXACA_PORT", "5000"),
                ("OAXACA_WAITER_MODE", "Batch"),
            ]))
            .unwrap();
        assert_eq!(config.http.port, 5000);
        assert_eq!(config.allocation.waiter_mode, WaiterAssignmentMode::Batch);
        assert_eq!(config.database.path, PathBuf::from("/tmp/floor.db"));
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let mut config = ServerConfig::default();
        let err = config
            .apply_overrides(env(&[("OAXACA_TABLE_COUNT", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validation() {
        let mut config = ServerConfig::default();
        config.floor.table_count = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.allocation.max_claim_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = ServerConfig::from_file(Path::new("/nonexistent/oaxaca.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
