//! Estimator configuration and construction errors.

use crate::model::{MAX_CONTEXT_BITS, MIN_CONTEXT_BITS};
use serde::{Deserialize, Serialize};
use std::collections::TryReserveError;

/// Default ceiling for any single per-context count.
pub const DEFAULT_MAX_CONTEXT_COUNT: u32 = 1 << 14;
/// Default ceiling for the sample and bias counters.
pub const DEFAULT_MAX_SAMPLES: u64 = 80_000;
/// Bits sampled before the global bias counters start recording.
pub const DEFAULT_WARMUP_BITS: u64 = 100;

/// Counter ceilings that trigger halving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverflowLimits {
    /// A context count reaching this value halves the whole table.
    pub max_context_count: u32,
    /// `bits_sampled` reaching this value halves it together with
    /// `entropy_bits`. Also bounds the bias counters.
    pub max_samples: u64,
}

impl Default for OverflowLimits {
    fn default() -> Self {
        Self {
            max_context_count: DEFAULT_MAX_CONTEXT_COUNT,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl OverflowLimits {
    /// Validates the ceilings. Halving a ceiling below 2 would leave a
    /// zero denominator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_context_count < 2 {
            return Err(ConfigError::ContextCountLimit(u64::from(
                self.max_context_count,
            )));
        }
        if self.max_samples < 2 {
            return Err(ConfigError::SampleLimit(self.max_samples));
        }
        Ok(())
    }
}

/// Configuration for one [`EntropyEstimator`](super::EntropyEstimator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatorConfig {
    /// Context length N, 1 to 30.
    pub context_bits: u8,
    /// Overflow ceilings.
    pub limits: OverflowLimits,
    /// Bits to sample before bias counting begins.
    pub warmup_bits: u64,
}

impl EstimatorConfig {
    /// Default limits and warm-up for a context of `context_bits` bits.
    pub fn new(context_bits: u8) -> Self {
        Self {
            context_bits,
            limits: OverflowLimits::default(),
            warmup_bits: DEFAULT_WARMUP_BITS,
        }
    }

    /// Replaces the overflow ceilings.
    pub fn with_limits(mut self, limits: OverflowLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Validates all parameters without allocating anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CONTEXT_BITS..=MAX_CONTEXT_BITS).contains(&self.context_bits) {
            return Err(ConfigError::ContextLength(self.context_bits));
        }
        self.limits.validate()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Context length outside 1..=30.
    #[error("context length {0} out of range (N must be from 1 to 30)")]
    ContextLength(u8),
    /// Context count ceiling below 2.
    #[error("context count ceiling {0} must be at least 2")]
    ContextCountLimit(u64),
    /// Sample ceiling below 2.
    #[error("sample ceiling {0} must be at least 2")]
    SampleLimit(u64),
    /// Checkpoint interval exponent outside 1..=63.
    #[error("diagnostic interval 2^{0} out of range (must be 1-63)")]
    DiagnosticInterval(u8),
    /// Health threshold outside its meaningful range.
    #[error("invalid health threshold: {0}")]
    Threshold(&'static str),
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// Config file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Errors constructing an estimator.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The context table could not be reserved.
    #[error("failed to allocate context table of {entries} entries: {source}")]
    Allocation {
        /// Requested number of contexts.
        entries: usize,
        /// Allocator failure.
        #[source]
        source: TryReserveError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(EstimatorConfig::new(8).validate().is_ok());
        assert!(OverflowLimits::default().validate().is_ok());
    }

    #[test]
    fn test_context_length_bounds() {
        for n in [1u8, 30] {
            assert!(EstimatorConfig::new(n).validate().is_ok());
        }
        for n in [0u8, 31, 255] {
            assert!(matches!(
                EstimatorConfig::new(n).validate(),
                Err(ConfigError::ContextLength(bad)) if bad == n
            ));
        }
    }

    #[test]
    fn test_degenerate_limits_rejected() {
        let config = EstimatorConfig::new(8).with_limits(OverflowLimits {
            max_context_count: 1,
            ..Default::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ContextCountLimit(1))
        ));

        let limits = OverflowLimits {
            max_samples: 0,
            ..Default::default()
        };
        assert!(matches!(limits.validate(), Err(ConfigError::SampleLimit(0))));
    }

    #[test]
    fn test_limits_from_toml() {
        let limits: OverflowLimits = toml::from_str("max_samples = 1000").unwrap();
        assert_eq!(limits.max_samples, 1000);
        assert_eq!(limits.max_context_count, DEFAULT_MAX_CONTEXT_COUNT);
    }
}
