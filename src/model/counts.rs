//! Zero/one occurrence counts for a single context.

/// Occurrence counts of each bit value following one context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitCounts {
    /// Times a zero followed this context.
    pub zeros: u32,
    /// Times a one followed this context.
    pub ones: u32,
}

impl BitCounts {
    /// Creates counts from explicit values.
    pub fn new(zeros: u32, ones: u32) -> Self {
        Self { zeros, ones }
    }

    /// Count for the given bit value.
    #[inline]
    pub fn of(&self, bit: bool) -> u32 {
        if bit {
            self.ones
        } else {
            self.zeros
        }
    }

    /// Total observations of this context.
    #[inline]
    pub fn total(&self) -> u64 {
        u64::from(self.zeros) + u64::from(self.ones)
    }

    /// Records one more occurrence of `bit` and returns the new count.
    #[inline]
    pub(crate) fn record(&mut self, bit: bool) -> u32 {
        let slot = if bit { &mut self.ones } else { &mut self.zeros };
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Halves both counts, keeping their ratio.
    #[inline]
    pub(crate) fn halve(&mut self) {
        self.zeros >>= 1;
        self.ones >>= 1;
    }

    /// Empirical probability of `bit`, or `None` if it was never seen.
    pub fn probability_of(&self, bit: bool) -> Option<f64> {
        match self.of(bit) {
            0 => None,
            count => Some(f64::from(count) / self.total() as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_halve() {
        let mut counts = BitCounts::default();
        counts.record(true);
        counts.record(true);
        counts.record(true);
        assert_eq!(counts.record(false), 1);
        assert_eq!(counts, BitCounts::new(1, 3));
        assert_eq!(counts.total(), 4);

        counts.halve();
        assert_eq!(counts, BitCounts::new(0, 1));
    }

    #[test]
    fn test_probability_of_unseen_is_none() {
        let counts = BitCounts::new(0, 4);
        assert_eq!(counts.probability_of(false), None);
        assert_eq!(counts.probability_of(true), Some(1.0));
        assert_eq!(BitCounts::default().probability_of(true), None);
    }
}
