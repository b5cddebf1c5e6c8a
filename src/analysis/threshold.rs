//! Quality thresholds for fail-closed behavior.
//!
//! Defines the levels at which an entropy source is considered to have
//! collapsed.

use crate::estimator::{ConfigError, EntropyEstimate};
use serde::{Deserialize, Serialize};

/// Quality thresholds for entropy monitoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Minimum acceptable entropy per bit.
    pub min_entropy_per_bit: f64,
    /// Maximum acceptable deviation of the ones fraction from 0.5.
    pub max_bias: f64,
    /// Bits that must have been sampled before a verdict is given.
    pub min_samples: u64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_entropy_per_bit: 0.8, // Typical noise sources sit well above this
            max_bias: 0.05,           // 5% bias tolerance
            min_samples: 10_000,
        }
    }
}

impl QualityThresholds {
    /// Creates more conservative thresholds.
    pub fn conservative() -> Self {
        Self {
            min_entropy_per_bit: 0.95,
            max_bias: 0.02,
            min_samples: 40_000,
        }
    }

    /// Creates more permissive thresholds (for testing).
    pub fn permissive() -> Self {
        Self {
            min_entropy_per_bit: 0.3,
            max_bias: 0.2,
            min_samples: 1_000,
        }
    }

    /// Rejects thresholds that could never or always pass.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_entropy_per_bit) {
            return Err(ConfigError::Threshold("min_entropy_per_bit must be in [0, 1]"));
        }
        if !(0.0..=0.5).contains(&self.max_bias) {
            return Err(ConfigError::Threshold("max_bias must be in [0, 0.5]"));
        }
        Ok(())
    }

    /// Checks an estimate against thresholds.
    pub fn check(&self, estimate: &EntropyEstimate) -> Result<(), ThresholdViolation> {
        if estimate.bits_sampled < self.min_samples {
            return Err(ThresholdViolation::InsufficientSamples {
                observed: estimate.bits_sampled,
                required: self.min_samples,
            });
        }

        if estimate.entropy_per_bit < self.min_entropy_per_bit {
            return Err(ThresholdViolation::LowEntropy {
                observed: estimate.entropy_per_bit,
                threshold: self.min_entropy_per_bit,
            });
        }

        if let Some(percent) = estimate.ones_percent {
            let bias = percent / 100.0 - 0.5;
            if bias.abs() > self.max_bias {
                return Err(ThresholdViolation::BitBias {
                    observed: bias,
                    threshold: self.max_bias,
                });
            }
        }

        Ok(())
    }
}

/// Threshold violation types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ThresholdViolation {
    /// Too few bits sampled for a verdict.
    #[error("only {observed} bits sampled, need {required}")]
    InsufficientSamples {
        /// Bits sampled.
        observed: u64,
        /// Bits required.
        required: u64,
    },

    /// Entropy per bit fell below the minimum.
    #[error("entropy per bit {observed:.4} below threshold {threshold:.4}")]
    LowEntropy {
        /// Estimated entropy per bit.
        observed: f64,
        /// Minimum allowed.
        threshold: f64,
    },

    /// Ones fraction strayed too far from one half.
    #[error("bit bias {observed:.4} exceeds threshold {threshold:.4}")]
    BitBias {
        /// Ones fraction minus 0.5.
        observed: f64,
        /// Maximum allowed deviation.
        threshold: f64,
    },
}
