//! Query Configuration
//!
//! Throttling parameters applied by the command-line tool.
//! Loaded from TOML; every field is optional and falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::queries::BackoffPolicy;
use crate::types::PoolSelector;

/// Main configuration for peer queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnQueryConfig {
    // === Backoff ===

    /// Backoff growth per consecutive failure (milliseconds)
    pub backoff_step_ms: u64,

    /// Upper bound on the backoff gap (milliseconds, unbounded if unset)
    pub backoff_max_ms: Option<u64>,

    // === Debounce ===

    /// Quiet period after the newest state change in a group (milliseconds)
    pub group_min_gap_ms: u64,

    // === Pools ===

    /// Stores `connectable` draws from when no pool is given
    pub default_pool: PoolSelector,
}

impl Default for ConnQueryConfig {
    fn default() -> Self {
        Self {
            backoff_step_ms: 5_000,            // 5 seconds
            backoff_max_ms: None,              // unbounded
            group_min_gap_ms: 5_000,           // 5 seconds
            default_pool: PoolSelector::Db,
        }
    }
}

impl ConnQueryConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    // Builder-style methods for CLI overrides

    pub fn with_backoff_step_ms(mut self, step_ms: Option<u64>) -> Self {
        if let Some(step_ms) = step_ms {
            self.backoff_step_ms = step_ms;
        }
        self
    }

    pub fn with_backoff_max_ms(mut self, max_ms: Option<u64>) -> Self {
        if max_ms.is_some() {
            self.backoff_max_ms = max_ms;
        }
        self
    }

    pub fn with_group_min_gap_ms(mut self, gap_ms: Option<u64>) -> Self {
        if let Some(gap_ms) = gap_ms {
            self.group_min_gap_ms = gap_ms;
        }
        self
    }

    /// Backoff policy described by this configuration
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.backoff_step_ms, self.backoff_max_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(max) = self.backoff_max_ms {
            if max < self.backoff_step_ms {
                anyhow::bail!(
                    "backoff_max_ms ({}) must not be below backoff_step_ms ({})",
                    max,
                    self.backoff_step_ms
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ConnQueryConfig::default();
        assert_eq!(config.backoff_step_ms, 5_000);
        assert_eq!(config.backoff_max_ms, None);
        assert_eq!(config.default_pool, PoolSelector::Db);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ConnQueryConfig::default();
        config.backoff_max_ms = Some(1_000);
        assert!(config.validate().is_err());
        assert_eq!(config.backoff_policy().max_ms(), Some(1_000));

        config.backoff_max_ms = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = ConnQueryConfig::default()
            .with_backoff_step_ms(Some(1_000))
            .with_backoff_max_ms(Some(60_000))
            .with_backoff_max_ms(None)
            .with_group_min_gap_ms(Some(30_000));

        assert_eq!(config.backoff_step_ms, 1_000);
        assert_eq!(config.backoff_max_ms, Some(60_000));
        assert_eq!(config.group_min_gap_ms, 30_000);
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conn-query.toml");

        let config = ConnQueryConfig {
            backoff_max_ms: Some(120_000),
            default_pool: PoolSelector::DbAndStaging,
            ..Default::default()
        };
        config.save(&path).unwrap();

        assert_eq!(ConnQueryConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ConnQueryConfig =
            toml::from_str("default_pool = \"staging\"\ngroup_min_gap_ms = 1000\n").unwrap();
        assert_eq!(config.default_pool, PoolSelector::Staging);
        assert_eq!(config.group_min_gap_ms, 1_000);
        assert_eq!(config.backoff_step_ms, 5_000);
    }
}
