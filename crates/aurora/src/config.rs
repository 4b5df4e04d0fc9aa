//! # Server Configuration
//!
//! Loaded once at startup from a TOML file; every field has a default so a
//! missing file or a partial file is not fatal to a caller that opts into
//! [`HudConfig::default`].

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default synchronization rate in ticks per second.
pub const DEFAULT_TICK_RATE: u32 = 20;

/// Default capacity of the outbound packet queue.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 4096;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML or has unknown/invalid fields.
    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HudConfig {
    /// Synchronization ticks per second.
    pub tick_rate: u32,
    /// Capacity of the outbound packet queue; packets beyond it are dropped
    /// with a warning.
    pub outbound_capacity: usize,
    /// Protocol revision advertised in the session handshake.
    pub protocol_revision: u64,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            protocol_revision: aurora_protocol::PROTOCOL_REVISION,
        }
    }
}

impl HudConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&raw)?)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a parse error for invalid TOML or unknown fields.
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HudConfig::default();
        assert_eq!(config.tick_rate, 20);
        assert_eq!(config.outbound_capacity, 4096);
        assert_eq!(config.protocol_revision, aurora_protocol::PROTOCOL_REVISION);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = HudConfig::from_toml("tick_rate = 10\n").unwrap();
        assert_eq!(config.tick_rate, 10);
        assert_eq!(config.outbound_capacity, DEFAULT_OUTBOUND_CAPACITY);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(HudConfig::from_toml("tick_rte = 10\n").is_err());
    }
}
