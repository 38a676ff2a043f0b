// randtick/crates/randtick/src/config.rs

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::TickerError;
use crate::sampler::validate_range;

/// What the emission loop does when the consumer has not drained the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    /// Wait for buffer space; ticks are delayed, never lost.
    #[default]
    Block,
    /// Discard the new tick and keep going.
    DropNewest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TickerConfig {
    /// lower sampling bound, inclusive
    pub min_interval_ms: u64,
    /// upper sampling bound, exclusive
    pub max_interval_ms: u64,
    /// fixed RNG seed (None = seed from entropy)
    pub seed: Option<u64>,
    /// buffered ticks the consumer may fall behind by
    pub capacity: usize,
    pub overflow: Overflow,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 0,
            max_interval_ms: 1_000,
            seed: None,
            capacity: 1,
            overflow: Overflow::Block,
        }
    }
}

impl TickerConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn validate(&self) -> std::result::Result<(), TickerError> {
        validate_range(self.min_interval(), self.max_interval())?;
        if self.capacity == 0 {
            return Err(TickerError::ZeroCapacity);
        }
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: TickerConfig = toml::from_str(contents).context("failed to parse ticker config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let cfg = TickerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.capacity, 1);
        assert_eq!(cfg.overflow, Overflow::Block);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = TickerConfig::from_toml_str("max_interval_ms = 250\n").unwrap();
        assert_eq!(cfg.min_interval(), Duration::ZERO);
        assert_eq!(cfg.max_interval(), Duration::from_millis(250));
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn overflow_parses_kebab_case() {
        let cfg = TickerConfig::from_toml_str(
            "min_interval_ms = 10\nmax_interval_ms = 20\noverflow = \"drop-newest\"\nseed = 5\n",
        )
        .unwrap();
        assert_eq!(cfg.overflow, Overflow::DropNewest);
        assert_eq!(cfg.seed, Some(5));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = TickerConfig::from_toml_str("min_interval_ms = 500\nmax_interval_ms = 100\n")
            .unwrap_err();
        assert!(err.to_string().contains("invalid interval range"));
    }

    #[test]
    fn zero_max_interval_is_rejected() {
        let err = TickerConfig::from_toml_str("min_interval_ms = 0\nmax_interval_ms = 0\n")
            .unwrap_err();
        assert!(err.to_string().contains("busy loop"));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let cfg = TickerConfig {
            capacity: 0,
            ..TickerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(TickerError::ZeroCapacity)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(TickerConfig::from_toml_str("interval = 5\n").is_err());
    }

    #[test]
    fn shipped_example_parses_to_defaults() {
        let example = include_str!("../../../ticker.toml.example");
        let cfg = TickerConfig::from_toml_str(example).unwrap();
        assert_eq!(cfg, TickerConfig::default());
    }

    #[test]
    fn loads_from_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            "min_interval_ms = 100\nmax_interval_ms = 300\ncapacity = 4\n",
        )
        .unwrap();
        let cfg = TickerConfig::from_path(file.path()).unwrap();
        assert_eq!(cfg.min_interval(), Duration::from_millis(100));
        assert_eq!(cfg.capacity, 4);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TickerConfig::from_path(Path::new("/nonexistent/ticker.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ticker.toml"));
    }
}
