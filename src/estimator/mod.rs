//! Adaptive sequential entropy estimation.
//!
//! [`EntropyEstimator`] owns everything needed to analyze one stream: the
//! context model, the sequential probability estimator, the bias counters
//! and the overflow guard. Each bit goes through them in that order.
//!
//! The estimate is only meaningful for sources well described by a single
//! hidden state variable (ring oscillators, zener noise, infinite noise
//! multipliers). Sources with extra hidden state, such as the bit position
//! within an ADC sample, will be overestimated.

mod bias;
mod config;
mod guard;
mod sequential;

pub use bias::BiasCounter;
pub use config::{
    ConfigError, EstimatorConfig, EstimatorError, OverflowLimits, DEFAULT_MAX_CONTEXT_COUNT,
    DEFAULT_MAX_SAMPLES, DEFAULT_WARMUP_BITS,
};
pub use guard::{OverflowGuard, RescaleCounts, Rescaled};
pub use sequential::SequentialEstimator;

use crate::model::ContextModel;
use std::fmt;

/// Outcome of feeding one bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitStep {
    /// Entropy bits extracted by this bit.
    pub extracted: u32,
    /// Rescalings this bit triggered.
    pub rescaled: Rescaled,
}

/// Point-in-time view of an estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct EntropyEstimate {
    /// Estimated entropy per bit.
    pub entropy_per_bit: f64,
    /// Branching factor K = 2^entropy_per_bit.
    pub branching_factor: f64,
    /// Accumulated entropy bits (after rescaling).
    pub entropy_bits: u64,
    /// Sampled bits (after rescaling).
    pub bits_sampled: u64,
    /// Bits processed over the whole run.
    pub total_bits: u64,
    /// Percentage of ones after warm-up, if any were counted.
    pub ones_percent: Option<f64>,
    /// Rescalings performed so far.
    pub rescales: RescaleCounts,
}

impl fmt::Display for EntropyEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Estimated entropy per bit: {:.6}, estimated K: {:.6}",
            self.entropy_per_bit, self.branching_factor
        )
    }
}

/// Order-N entropy estimator for a single bit stream.
///
/// A fresh instance is needed per stream; nothing is shared between
/// instances.
pub struct EntropyEstimator {
    model: ContextModel,
    sequential: SequentialEstimator,
    bias: BiasCounter,
    guard: OverflowGuard,
    total_bits: u64,
}

impl EntropyEstimator {
    /// Validates `config` and allocates the context table.
    pub fn new(config: &EstimatorConfig) -> Result<Self, EstimatorError> {
        config.validate()?;
        let model = ContextModel::new(config.context_bits)?;

        tracing::debug!(
            context_bits = config.context_bits,
            max_context_count = config.limits.max_context_count,
            max_samples = config.limits.max_samples,
            "Estimator ready"
        );

        Ok(Self {
            model,
            sequential: SequentialEstimator::new(),
            bias: BiasCounter::new(config.warmup_bits),
            guard: OverflowGuard::new(config.limits),
            total_bits: 0,
        })
    }

    /// Estimator with default limits and `context_bits` of context.
    pub fn with_context_bits(context_bits: u8) -> Result<Self, EstimatorError> {
        Self::new(&EstimatorConfig::new(context_bits))
    }

    /// Feeds one bit through model, estimator and guard.
    #[inline]
    pub fn add_bit(&mut self, bit: bool) -> BitStep {
        self.total_bits += 1;

        let update = self.model.update(bit);
        self.bias.record(bit, self.sequential.bits_sampled());
        let extracted = self.sequential.accumulate(update.before, bit);
        let rescaled = self.guard.check(
            &update,
            &mut self.model,
            &mut self.sequential,
            &mut self.bias,
        );

        BitStep {
            extracted,
            rescaled,
        }
    }

    /// Feeds the 8 bits of `byte`, most significant first.
    pub fn add_byte(&mut self, byte: u8) {
        for shift in (0..8).rev() {
            self.add_bit((byte >> shift) & 1 == 1);
        }
    }

    /// Feeds every byte of `bytes` in order.
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        bytes.iter().for_each(|&byte| self.add_byte(byte));
    }

    /// Current entropy per bit estimate.
    pub fn entropy_per_bit(&self) -> f64 {
        self.sequential.entropy_per_bit()
    }

    /// Current branching factor K.
    pub fn branching_factor(&self) -> f64 {
        self.sequential.branching_factor()
    }

    /// Bits processed since construction; never rescaled.
    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Snapshot of every running quantity.
    pub fn estimate(&self) -> EntropyEstimate {
        EntropyEstimate {
            entropy_per_bit: self.sequential.entropy_per_bit(),
            branching_factor: self.sequential.branching_factor(),
            entropy_bits: self.sequential.entropy_bits(),
            bits_sampled: self.sequential.bits_sampled(),
            total_bits: self.total_bits,
            ones_percent: self.bias.ones_percent(),
            rescales: self.guard.counts(),
        }
    }

    /// The context model.
    pub fn model(&self) -> &ContextModel {
        &self.model
    }

    /// The sequential probability estimator.
    pub fn sequential(&self) -> &SequentialEstimator {
        &self.sequential
    }

    /// The global bias counters.
    pub fn bias(&self) -> &BiasCounter {
        &self.bias
    }
}

impl fmt::Debug for EntropyEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntropyEstimator")
            .field("model", &self.model)
            .field("sequential", &self.sequential)
            .field("total_bits", &self.total_bits)
            .finish()
    }
}
