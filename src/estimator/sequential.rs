//! Sequential probability estimation with incremental entropy extraction.
//!
//! The probability of the whole observed sequence is the product of the
//! per-bit conditional probabilities. Rather than keep that product, which
//! underflows after a few thousand bits, the estimator keeps it as
//! `2^-entropy_bits * probability` with `probability` in (0.5, 1.0]:
//! whenever the mantissa drops to 0.5 or below it is doubled and one more
//! bit of self-information is counted.

use crate::model::BitCounts;

/// Running self-information of the observed bit sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequentialEstimator {
    probability: f64,
    entropy_bits: u64,
    bits_sampled: u64,
}

impl SequentialEstimator {
    /// Starts with probability 1.0 and nothing sampled.
    pub fn new() -> Self {
        Self {
            probability: 1.0,
            entropy_bits: 0,
            bits_sampled: 0,
        }
    }

    /// Accounts for one observed `bit` given the counts of its context
    /// before this observation. Returns the whole bits of entropy
    /// extracted by this step.
    ///
    /// A bit value never seen in its context leaves the probability
    /// untouched rather than driving it to zero.
    #[inline]
    pub fn accumulate(&mut self, before: BitCounts, bit: bool) -> u32 {
        if let Some(p) = before.probability_of(bit) {
            self.probability *= p;
        }

        let mut extracted = 0;
        while self.probability <= 0.5 {
            self.probability *= 2.0;
            extracted += 1;
        }

        self.entropy_bits += u64::from(extracted);
        self.bits_sampled += 1;
        extracted
    }

    /// Halves `entropy_bits` and `bits_sampled` together.
    pub(crate) fn halve(&mut self) {
        self.entropy_bits >>= 1;
        self.bits_sampled >>= 1;
    }

    /// Entropy bits per sampled bit; 0.0 before any bit is sampled.
    pub fn entropy_per_bit(&self) -> f64 {
        if self.bits_sampled == 0 {
            return 0.0;
        }
        self.entropy_bits as f64 / self.bits_sampled as f64
    }

    /// Effective number of equally likely next states, `2^entropy_per_bit`.
    pub fn branching_factor(&self) -> f64 {
        self.entropy_per_bit().exp2()
    }

    /// Current mantissa of the sequence probability, in (0.5, 1.0].
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Entropy bits extracted (after rescaling).
    pub fn entropy_bits(&self) -> u64 {
        self.entropy_bits
    }

    /// Bits sampled (after rescaling).
    pub fn bits_sampled(&self) -> u64 {
        self.bits_sampled
    }
}

impl Default for SequentialEstimator {
    fn default() -> Self {
        Self::new()
    }
}
