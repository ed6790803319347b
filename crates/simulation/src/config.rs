//! Simulation settings.

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for the controller. Every field has a default, so a config
/// file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Capacity granted per unit of weight.
    pub capacity_unit: u32,
    /// How long an assigned request holds its unit of load.
    pub release_after_ms: u64,
    /// Maximum number of log lines kept.
    pub log_capacity: usize,
    /// Interval between automatic injections.
    pub auto_inject_interval_ms: u64,
    /// Log lines included in a snapshot.
    pub snapshot_log_lines: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            capacity_unit: 10,
            release_after_ms: 2000,
            log_capacity: 100,
            auto_inject_interval_ms: 2000,
            snapshot_log_lines: 10,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| SimulationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.auto_inject_interval_ms == 0 {
            return Err(SimulationError::Config(
                "auto_inject_interval_ms must be positive".into(),
            ));
        }
        if self.log_capacity == 0 {
            return Err(SimulationError::Config("log_capacity must be positive".into()));
        }
        Ok(())
    }

    pub fn release_after(&self) -> Duration {
        Duration::from_millis(self.release_after_ms)
    }

    pub fn auto_inject_interval(&self) -> Duration {
        Duration::from_millis(self.auto_inject_interval_ms)
    }

    /// Capacity of a node with the given weight.
    pub fn capacity_for(&self, weight: u32) -> u32 {
        weight.saturating_mul(self.capacity_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimulationConfig::from_json(r#"{ "capacity_unit": 4 }"#).unwrap();
        assert_eq!(config.capacity_unit, 4);
        assert_eq!(config.release_after(), Duration::from_millis(2000));
        assert_eq!(config.capacity_for(5), 20);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = SimulationConfig::from_json(r#"{ "auto_inject_interval_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, SimulationError::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(SimulationConfig::from_json("{ nope").is_err());
    }
}
