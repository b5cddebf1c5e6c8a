//! Global ones/zeros counters, for diagnostics only.

/// Counts ones and zeros over the whole stream once the warm-up is over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BiasCounter {
    ones: u64,
    zeros: u64,
    warmup_bits: u64,
}

impl BiasCounter {
    /// Creates empty counters that ignore the first `warmup_bits` samples.
    pub fn new(warmup_bits: u64) -> Self {
        Self {
            ones: 0,
            zeros: 0,
            warmup_bits,
        }
    }

    /// Records `bit` if more than the warm-up count has been sampled.
    #[inline]
    pub fn record(&mut self, bit: bool, bits_sampled: u64) {
        if bits_sampled <= self.warmup_bits {
            return;
        }
        if bit {
            self.ones += 1;
        } else {
            self.zeros += 1;
        }
    }

    /// Percentage of ones among recorded bits, if any were recorded.
    pub fn ones_percent(&self) -> Option<f64> {
        let total = self.ones + self.zeros;
        (total > 0).then(|| self.ones as f64 * 100.0 / total as f64)
    }

    /// The larger of the two counters.
    pub fn max(&self) -> u64 {
        self.ones.max(self.zeros)
    }

    pub(crate) fn halve(&mut self) {
        self.ones >>= 1;
        self.zeros >>= 1;
    }

    /// Ones recorded (after rescaling).
    pub fn ones(&self) -> u64 {
        self.ones
    }

    /// Zeros recorded (after rescaling).
    pub fn zeros(&self) -> u64 {
        self.zeros
    }
}
