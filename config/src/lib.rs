//! # Configuration Management for ShadowStore
//!
//! This crate provides centralized configuration structures for all ShadowStore
//! components, covering the storage engine, the cache layer, and store-level
//! behavior such as table naming.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{EngineConfig, CacheSettings, StoreConfig};
//!
//! let engine = EngineConfig::new("sqlite::memory:".to_string(), 1, 30, 600);
//! let cache = CacheSettings::new("shadowstore_".to_string());
//! let store = StoreConfig::default();
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [engine]
//! database_url = "sqlite://shadowstore.db"
//! max_connections = 5
//! connection_timeout_seconds = 30
//! idle_timeout_seconds = 600
//!
//! [cache]
//! key_prefix = "shadowstore_"
//! redis_url = "redis://localhost:6379"
//!
//! [store]
//! table_prefix = "ss_"
//! scan_warn_threshold = 500
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from shadowstore.toml or the SHADOWSTORE_CONFIG env path
//! let config = AppConfig::load().unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./shadowstore.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub cache: CacheSettings,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Storage engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Connection URL understood by the backing engine
    pub database_url: String,
    pub max_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

/// Cache layer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Prefix prepended to every cache key
    pub key_prefix: String,

    /// Redis connection string; absent means the in-memory cache is used
    pub redis_url: Option<String>,

    /// Connection timeout in milliseconds
    pub connection_timeout_ms: Option<u64>,
}

/// Store-level behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Prefix prepended to every physical table name
    pub table_prefix: String,

    /// Result-set size above which a full-scan property lookup is logged
    pub scan_warn_threshold: usize,
}

impl AppConfig {
    /// Load configuration from TOML file specified in the environment or defaults
    pub fn load() -> Result<Self, ConfigError> {
        // .env is optional; a missing file is not an error
        let _ = dotenvy::dotenv();

        let config = if let Ok(config_path) = env::var("SHADOWSTORE_CONFIG") {
            Self::from_file(&config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified as SHADOWSTORE_CONFIG or in {} file",
                DEFAULT_CONFIG_PATH
            )))
        }?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.database_url.is_empty() {
            return Err(ConfigError::Invalid(
                "Engine database_url cannot be empty".to_string(),
            ));
        }
        if self.engine.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "Engine max_connections must be greater than 0".to_string(),
            ));
        }
        if self.engine.connection_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Engine connection_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.cache.key_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "Cache key_prefix cannot be empty".to_string(),
            ));
        }
        if let Some(url) = &self.cache.redis_url {
            if url.is_empty() {
                return Err(ConfigError::Invalid(
                    "Cache redis_url cannot be empty when set".to_string(),
                ));
            }
        }

        if self.store.table_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "Store table_prefix cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new(
        database_url: String,
        max_connections: u32,
        connection_timeout_seconds: u64,
        idle_timeout_seconds: u64,
    ) -> Self {
        Self {
            database_url,
            max_connections,
            connection_timeout_seconds,
            idle_timeout_seconds,
        }
    }
}

impl CacheSettings {
    /// Create a new cache configuration backed by the in-memory store
    pub fn new(key_prefix: String) -> Self {
        Self {
            key_prefix,
            redis_url: None,
            connection_timeout_ms: Some(5000),
        }
    }

    pub fn with_redis_url(mut self, redis_url: String) -> Self {
        self.redis_url = Some(redis_url);
        self
    }

    pub fn with_connection_timeout(mut self, timeout_ms: u64) -> Self {
        self.connection_timeout_ms = Some(timeout_ms);
        self
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            key_prefix: "shadowstore_".to_string(),
            redis_url: None,
            connection_timeout_ms: Some(5000),
        }
    }
}

impl StoreConfig {
    pub fn new(table_prefix: String, scan_warn_threshold: usize) -> Self {
        Self {
            table_prefix,
            scan_warn_threshold,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_prefix: "ss_".to_string(),
            scan_warn_threshold: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_toml_round_trip() {
        let toml = r#"
            [engine]
            database_url = "sqlite::memory:"
            max_connections = 1
            connection_timeout_seconds = 30
            idle_timeout_seconds = 600

            [cache]
            key_prefix = "shadowstore_"

            [store]
            table_prefix = "ss_"
            scan_warn_threshold = 100
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.engine.database_url, "sqlite::memory:");
        assert_eq!(config.store.table_prefix, "ss_");
        assert_eq!(config.store.scan_warn_threshold, 100);
        assert!(config.cache.redis_url.is_none());
    }

    #[test]
    fn store_section_is_optional() {
        let toml = r#"
            [engine]
            database_url = "sqlite::memory:"
            max_connections = 1
            connection_timeout_seconds = 30
            idle_timeout_seconds = 600

            [cache]
            key_prefix = "shadowstore_"
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.store.table_prefix, "ss_");
    }

    #[test]
    fn empty_table_prefix_rejected() {
        let config = AppConfig {
            engine: EngineConfig::new("sqlite::memory:".into(), 1, 30, 600),
            cache: CacheSettings::default(),
            store: StoreConfig::new(String::new(), 500),
        };
        assert!(config.validate().is_err());
    }
}
