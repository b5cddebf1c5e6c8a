//! Overflow guard.
//!
//! Every counter in the estimator is bounded by periodically halving it
//! together with the counters it forms a ratio with. Halving loses the
//! precision of the oldest observations; in exchange the estimator can run
//! on an unbounded stream, and it keeps tracking a source whose behavior
//! drifts.

use super::{bias::BiasCounter, config::OverflowLimits, sequential::SequentialEstimator};
use crate::model::{ContextModel, ContextUpdate};

/// Which rescalings a single bit triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rescaled {
    /// The whole context table was halved.
    pub contexts: bool,
    /// `entropy_bits` and `bits_sampled` were halved.
    pub samples: bool,
    /// The bias counters were halved.
    pub bias: bool,
}

impl Rescaled {
    /// Returns true if any rescaling happened.
    pub fn any(&self) -> bool {
        self.contexts || self.samples || self.bias
    }
}

/// Number of rescalings of each kind over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescaleCounts {
    /// Context table halvings.
    pub contexts: u64,
    /// Entropy/sample counter halvings.
    pub samples: u64,
    /// Bias counter halvings.
    pub bias: u64,
}

/// Applies the three independent halving checks after each bit.
#[derive(Debug, Clone)]
pub struct OverflowGuard {
    limits: OverflowLimits,
    counts: RescaleCounts,
}

impl OverflowGuard {
    /// Creates a guard enforcing `limits`.
    pub fn new(limits: OverflowLimits) -> Self {
        Self {
            limits,
            counts: RescaleCounts::default(),
        }
    }

    /// Runs all checks for the bit that produced `update`.
    pub fn check(
        &mut self,
        update: &ContextUpdate,
        model: &mut ContextModel,
        sequential: &mut SequentialEstimator,
        bias: &mut BiasCounter,
    ) -> Rescaled {
        Rescaled {
            contexts: self.check_contexts(update, model),
            samples: self.check_samples(sequential),
            bias: self.check_bias(bias),
        }
    }

    /// Only the count just incremented can have reached the ceiling, but
    /// the whole table is halved so contexts stay comparable.
    fn check_contexts(&mut self, update: &ContextUpdate, model: &mut ContextModel) -> bool {
        if update.count_after < self.limits.max_context_count {
            return false;
        }
        model.halve();
        self.counts.contexts += 1;
        tracing::debug!(
            context = update.context,
            rescales = self.counts.contexts,
            "Halved context table"
        );
        true
    }

    fn check_samples(&mut self, sequential: &mut SequentialEstimator) -> bool {
        if sequential.bits_sampled() < self.limits.max_samples {
            return false;
        }
        sequential.halve();
        self.counts.samples += 1;
        tracing::trace!(
            entropy_bits = sequential.entropy_bits(),
            bits_sampled = sequential.bits_sampled(),
            "Halved entropy counters"
        );
        true
    }

    fn check_bias(&mut self, bias: &mut BiasCounter) -> bool {
        if bias.max() < self.limits.max_samples {
            return false;
        }
        bias.halve();
        self.counts.bias += 1;
        true
    }

    /// Ceilings in force.
    pub fn limits(&self) -> &OverflowLimits {
        &self.limits
    }

    /// Rescalings performed so far.
    pub fn counts(&self) -> RescaleCounts {
        self.counts
    }
}
