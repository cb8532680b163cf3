// config/src/lib.rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use types::chain::PROTOCOL_GENESIS_HEIGHT;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("could not determine a config directory")]
    NoConfigDir,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chain RPC connection settings
    pub chain: ChainConfig,
    /// Indexer start state
    pub indexer: IndexerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Chain RPC connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL
    pub rpc_url: String,
    /// Seconds to wait between polls of the chain tip
    pub poll_interval_secs: u64,
}

/// Indexer start state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Height the ledger starts at; the first applied block is the
    /// next one
    pub start_height: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/rosescriptions-indexer/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("rosescriptions-indexer");
        Ok(config_dir.join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainConfig {
                rpc_url: "https://emerald.oasis.dev".to_string(),
                poll_interval_secs: 3,
            },
            indexer: IndexerConfig {
                start_height: PROTOCOL_GENESIS_HEIGHT,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
