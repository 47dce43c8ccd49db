//! # Driver and Transport Configuration
//!
//! Configuration is plain serde data, loadable from JSON:
//!
//! ```json
//! {
//!   "write_poll_attempts": 10,
//!   "lock_policy": {
//!     "cc_file": "BLOCK0 | BLOCK1",
//!     "cfg": "LOCKED",
//!     "rfa1": { "password": "none", "protection": "write_forbidden" }
//!   }
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults below.

use crate::registers::{AreaPassword, AreaSecurity, CcFileLock, ConfigLock, RfProtection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the transport connection URL
pub const ENV_I2C_URL: &str = "ST25DV_I2C_URL";

/// Environment variable holding the bus clock frequency in Hz
pub const ENV_I2C_FREQUENCY: &str = "ST25DV_I2C_FREQUENCY";

pub const DEFAULT_I2C_URL: &str = "i2c:///1";

/// 100 kHz standard mode
pub const DEFAULT_CLOCK_FREQUENCY_HZ: u32 = 100_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Values written by the lock operations.
///
/// The defaults lock both capability-container blocks, lock the RF
/// configuration and forbid RF writes to area 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockPolicy {
    /// Written to LOCK_CCFILE
    pub cc_file: CcFileLock,
    /// Written to LOCK_CFG
    pub cfg: ConfigLock,
    /// Written to RFA1SS
    pub rfa1: AreaSecurity,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            cc_file: CcFileLock::BLOCK0 | CcFileLock::BLOCK1,
            cfg: ConfigLock::LOCKED,
            rfa1: AreaSecurity {
                password: AreaPassword::None,
                protection: RfProtection::WriteForbidden,
            },
        }
    }
}

/// Tag driver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Acknowledgment polls after each lock write; 0 disables polling
    pub write_poll_attempts: u32,
    pub lock_policy: LockPolicy,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            write_poll_attempts: 0,
            lock_policy: LockPolicy::default(),
        }
    }
}

impl DriverConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Transport connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Connection URL, e.g. "i2c:///1" or "/dev/i2c-1"
    pub url: String,
    pub clock_frequency_hz: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_I2C_URL.to_string(),
            clock_frequency_hz: DEFAULT_CLOCK_FREQUENCY_HZ,
        }
    }
}

impl TransportConfig {
    pub fn new(url: impl Into<String>, clock_frequency_hz: u32) -> Self {
        Self {
            url: url.into(),
            clock_frequency_hz,
        }
    }

    /// Build from `ST25DV_I2C_URL` / `ST25DV_I2C_FREQUENCY`, defaulting
    /// whatever is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`TransportConfig::from_env`] with an injectable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_I2C_URL) {
            config.url = url;
        }
        if let Some(freq) = lookup(ENV_I2C_FREQUENCY) {
            config.clock_frequency_hz =
                freq.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_I2C_FREQUENCY,
                    value: freq.clone(),
                })?;
        }
        Ok(config)
    }
}
