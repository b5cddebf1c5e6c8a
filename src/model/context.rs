//! The context register and its count table.

use super::BitCounts;
use crate::estimator::{ConfigError, EstimatorError};

/// Smallest supported context length in bits.
pub const MIN_CONTEXT_BITS: u8 = 1;
/// Largest supported context length in bits.
pub const MAX_CONTEXT_BITS: u8 = 30;

/// Result of feeding one bit through the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextUpdate {
    /// Context the bit was observed in.
    pub context: u32,
    /// Counts at that context before this bit was recorded.
    pub before: BitCounts,
    /// Count of the observed bit value after recording it.
    pub count_after: u32,
}

/// Order-N binary context model.
///
/// Holds an N-bit shift register of the most recent bits and a flat table
/// of 2^N [`BitCounts`], indexed by the register value.
pub struct ContextModel {
    bits: u8,
    mask: u32,
    context: u32,
    table: Vec<BitCounts>,
}

impl ContextModel {
    /// Allocates a model using the last `bits` bits as context.
    ///
    /// Fails with a configuration error if `bits` is outside
    /// [`MIN_CONTEXT_BITS`]..=[`MAX_CONTEXT_BITS`], and with an allocation
    /// error if the 2^`bits` entry table cannot be reserved.
    pub fn new(bits: u8) -> Result<Self, EstimatorError> {
        if !(MIN_CONTEXT_BITS..=MAX_CONTEXT_BITS).contains(&bits) {
            return Err(ConfigError::ContextLength(bits).into());
        }

        let entries = 1usize << bits;
        let mut table = Vec::new();
        table
            .try_reserve_exact(entries)
            .map_err(|source| EstimatorError::Allocation { entries, source })?;
        table.resize(entries, BitCounts::default());

        tracing::debug!(context_bits = bits, entries, "Allocated context table");

        Ok(Self {
            bits,
            mask: ((1u64 << bits) - 1) as u32,
            context: 0,
            table,
        })
    }

    /// Records `bit` in the current context, then shifts it into the
    /// register.
    #[inline]
    pub fn update(&mut self, bit: bool) -> ContextUpdate {
        let context = self.context;
        let slot = &mut self.table[context as usize];
        let before = *slot;
        let count_after = slot.record(bit);

        self.context = ((context << 1) | u32::from(bit)) & self.mask;

        ContextUpdate {
            context,
            before,
            count_after,
        }
    }

    /// Halves every count in every context.
    pub fn halve(&mut self) {
        self.table.iter_mut().for_each(BitCounts::halve);
    }

    /// Counts for `context`, masked to the model width.
    pub fn counts(&self, context: u32) -> BitCounts {
        self.table[(context & self.mask) as usize]
    }

    /// Current value of the context register.
    pub fn context(&self) -> u32 {
        self.context
    }

    /// Context length N.
    pub fn context_bits(&self) -> u8 {
        self.bits
    }

    /// Number of contexts (2^N).
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Always false; a model has at least two contexts.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Iterates over `(context, counts)` for every context.
    pub fn iter(&self) -> impl Iterator<Item = (u32, BitCounts)> + '_ {
        self.table
            .iter()
            .enumerate()
            .map(|(context, counts)| (context as u32, *counts))
    }
}

impl std::fmt::Debug for ContextModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextModel")
            .field("bits", &self.bits)
            .field("context", &format_args!("{:#x}", self.context))
            .field("entries", &self.table.len())
            .finish()
    }
}
