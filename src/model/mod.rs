//! Order-N binary context model.
//!
//! For every possible N-bit history the model keeps how often the next bit
//! was a zero and how often it was a one. The estimator reads these counts
//! to predict each incoming bit.

mod context;
mod counts;

pub use context::{ContextModel, ContextUpdate, MAX_CONTEXT_BITS, MIN_CONTEXT_BITS};
pub use counts::BitCounts;
