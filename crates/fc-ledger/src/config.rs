//! Configuration types for the ledger

use crate::error::{LedgerError, Result};
use crate::utils::hashing::DIGEST_HEX_LEN;
use serde::Deserialize;
use std::env;

/// Runtime configuration for the ledger
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LedgerConfig {
    /// Required leading zero hex characters per block hash
    pub difficulty: u32,

    /// Nonce search tuning
    pub mining: MiningConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: crate::DEFAULT_DIFFICULTY,
            mining: MiningConfig::default(),
        }
    }
}

/// Nonce search configuration
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MiningConfig {
    /// How many attempts between checks of the cancellation flag (default: 10_000)
    pub cancel_check_interval: u64,

    /// How many attempts between debug progress records (default: 100_000)
    pub progress_interval: u64,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            cancel_check_interval: 10_000,
            progress_interval: 100_000,
        }
    }
}

impl LedgerConfig {
    /// Config with the given difficulty and default mining settings.
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FC_DIFFICULTY`: leading zero count (default: 4)
    /// - `FC_CANCEL_CHECK_INTERVAL`: attempts between cancellation checks (default: 10000)
    /// - `FC_PROGRESS_INTERVAL`: attempts between progress logs (default: 100000)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            difficulty: parse_env("FC_DIFFICULTY").unwrap_or(defaults.difficulty),
            mining: MiningConfig {
                cancel_check_interval: parse_env("FC_CANCEL_CHECK_INTERVAL")
                    .unwrap_or(defaults.mining.cancel_check_interval),
                progress_interval: parse_env("FC_PROGRESS_INTERVAL")
                    .unwrap_or(defaults.mining.progress_interval),
            },
        }
    }

    /// Reject settings the miner cannot honour.
    pub fn validate(&self) -> Result<()> {
        let max = DIGEST_HEX_LEN as u32;
        if self.difficulty > max {
            return Err(LedgerError::DifficultyTooHigh {
                difficulty: self.difficulty,
                max,
            });
        }
        if self.mining.cancel_check_interval == 0 {
            return Err(LedgerError::InvalidConfig(
                "cancel_check_interval must be non-zero".to_string(),
            ));
        }
        if self.mining.progress_interval == 0 {
            return Err(LedgerError::InvalidConfig(
                "progress_interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.difficulty, 4);
        assert_eq!(config.mining.cancel_check_interval, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_difficulty_above_digest_length_rejected() {
        let config = LedgerConfig::with_difficulty(65);
        assert!(matches!(
            config.validate(),
            Err(LedgerError::DifficultyTooHigh { difficulty: 65, max: 64 })
        ));
        assert!(LedgerConfig::with_difficulty(64).validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = LedgerConfig::default();
        config.mining.cancel_check_interval = 0;
        assert!(matches!(config.validate(), Err(LedgerError::InvalidConfig(_))));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LedgerConfig = serde_json::from_str(r#"{"difficulty": 2}"#).unwrap();
        assert_eq!(config.difficulty, 2);
        assert_eq!(config.mining, MiningConfig::default());
    }
}
