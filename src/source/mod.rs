//! Byte sources feeding the estimator.
//!
//! The estimator only needs an ordered stream of bytes that ends at some
//! point. Files, standard input, in-memory buffers and seeded generators
//! all satisfy the [`ByteSource`] trait.

mod byte_source;
mod reader;

pub use byte_source::{ByteSource, RngSource, SliceSource, SourceError};
pub use reader::{FileSource, ReaderSource};
