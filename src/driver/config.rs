//! Run configuration.
//!
//! The context length comes from the command line; everything else may
//! be tuned from a TOML file. Every section is optional.
//!
//! ```toml
//! [limits]
//! max_context_count = 16384
//! max_samples = 80000
//!
//! [diagnostics]
//! enabled = true
//! interval_log2 = 20
//!
//! [health]
//! min_healthy_streak = 1
//! min_entropy_per_bit = 0.8
//! max_bias = 0.05
//! min_samples = 10000
//! ```

use crate::analysis::QualityThresholds;
use crate::estimator::{ConfigError, EstimatorConfig, OverflowLimits};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Periodic diagnostic output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Log the running estimate at every checkpoint.
    pub enabled: bool,
    /// Checkpoints happen every 2^`interval_log2` bits.
    pub interval_log2: u8,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_log2: 20,
        }
    }
}

impl DiagnosticsConfig {
    /// Validates the checkpoint interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=63).contains(&self.interval_log2) {
            return Err(ConfigError::DiagnosticInterval(self.interval_log2));
        }
        Ok(())
    }

    /// Mask whose low bits are all zero exactly at a checkpoint.
    pub fn checkpoint_mask(&self) -> u64 {
        (1u64 << self.interval_log2) - 1
    }
}

/// Health monitoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Consecutive passing checkpoints before the source is healthy.
    pub min_healthy_streak: u64,
    /// Minimum entropy per bit.
    pub min_entropy_per_bit: f64,
    /// Maximum deviation of the ones fraction from 0.5.
    pub max_bias: f64,
    /// Bits sampled before any verdict.
    pub min_samples: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        let thresholds = QualityThresholds::default();
        Self {
            min_healthy_streak: 1,
            min_entropy_per_bit: thresholds.min_entropy_per_bit,
            max_bias: thresholds.max_bias,
            min_samples: thresholds.min_samples,
        }
    }
}

impl HealthConfig {
    /// Thresholds the health monitor checks against.
    pub fn thresholds(&self) -> QualityThresholds {
        QualityThresholds {
            min_entropy_per_bit: self.min_entropy_per_bit,
            max_bias: self.max_bias,
            min_samples: self.min_samples,
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Counter ceilings.
    #[serde(default)]
    pub limits: OverflowLimits,
    /// Diagnostic output.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Health monitoring.
    #[serde(default)]
    pub health: HealthConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.limits.validate()?;
        config.diagnostics.validate()?;
        config.health.thresholds().validate()?;
        Ok(config)
    }
}

/// Everything a [`StreamDriver`](super::StreamDriver) needs.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Estimator parameters, including the context length.
    pub estimator: EstimatorConfig,
    /// Periodic diagnostics.
    pub diagnostics: DiagnosticsConfig,
    /// Health monitoring.
    pub health: HealthConfig,
}

impl DriverConfig {
    /// Defaults for a context of `context_bits` bits.
    pub fn new(context_bits: u8) -> Self {
        Self::from_file_config(context_bits, FileConfig::default())
    }

    /// Combines a context length with settings loaded from a file.
    pub fn from_file_config(context_bits: u8, file: FileConfig) -> Self {
        Self {
            estimator: EstimatorConfig::new(context_bits).with_limits(file.limits),
            diagnostics: file.diagnostics,
            health: file.health,
        }
    }

    /// Turns periodic diagnostics on or off.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics.enabled = enabled;
        self
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.estimator.validate()?;
        self.diagnostics.validate()?;
        self.health.thresholds().validate()
    }
}
