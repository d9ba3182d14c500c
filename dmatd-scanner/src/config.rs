//! Serializable scan configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dmatd_core::DmaTdParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::binance::{DEFAULT_BASE_URL, MAX_KLINE_LIMIT};
use super::provider::Interval;

/// Errors loading or validating a scan configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything one scan needs besides the data provider.
///
/// Every key is optional; a missing `[params]` table means the strategy
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub symbols: Vec<String>,
    pub interval: Interval,
    /// Candles requested per symbol.
    pub limit: usize,
    /// Pause between consecutive fetches.
    pub pacing_ms: u64,
    pub base_url: String,
    pub params: DmaTdParams,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            symbols: [
                "BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "DOGEUSDT", "NOTUSDT", "PEPEUSDT",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            interval: Interval::FourHours,
            limit: 100,
            pacing_ms: 1000,
            base_url: DEFAULT_BASE_URL.to_string(),
            params: DmaTdParams::default(),
        }
    }
}

impl ScanConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("symbols must not be empty".into()));
        }
        if let Some(blank) = self.symbols.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("symbol #{} is blank", blank + 1)));
        }
        if self.limit == 0 || self.limit > MAX_KLINE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "limit must be between 1 and {MAX_KLINE_LIMIT}, got {}",
                self.limit
            )));
        }
        Ok(())
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}
