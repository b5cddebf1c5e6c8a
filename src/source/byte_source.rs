//! The byte source abstraction and its in-memory implementations.

use rand_core::RngCore;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while pulling bytes from a source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The input could not be opened.
    #[error("unable to open {} for reading: {source}", path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Reading the next byte failed.
    #[error("failed to read {origin} at byte offset {offset}: {source}")]
    Read {
        /// Input description, usually a path.
        origin: String,
        /// Bytes successfully read before the failure.
        offset: u64,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// An ordered, finite sequence of bytes.
///
/// Byte `i + 1` is never requested before byte `i` has been fully
/// consumed, so implementations may block.
pub trait ByteSource {
    /// Returns the next byte, or `None` once the stream is exhausted.
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        (**self).next_byte()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        (**self).next_byte()
    }
}

/// Byte source over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    /// Creates a source yielding `bytes` from the start.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }
}

impl ByteSource for SliceSource<'_> {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        let byte = self.bytes.get(self.position).copied();
        if byte.is_some() {
            self.position += 1;
        }
        Ok(byte)
    }
}

/// Generator output is drawn a block at a time.
const RNG_BLOCK: usize = 64;

/// Byte source that draws a fixed number of bytes from a generator.
///
/// Useful for exercising the estimator against a known-good reference,
/// e.g. a seeded ChaCha stream standing in for an ideal noise source.
#[derive(Debug)]
pub struct RngSource<R> {
    rng: R,
    remaining: u64,
    block: [u8; RNG_BLOCK],
    position: usize,
}

impl<R: RngCore> RngSource<R> {
    /// Creates a source yielding `len` bytes drawn from `rng`.
    pub fn new(rng: R, len: u64) -> Self {
        Self {
            rng,
            remaining: len,
            block: [0; RNG_BLOCK],
            position: RNG_BLOCK,
        }
    }
}

impl<R: RngCore> ByteSource for RngSource<R> {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        if self.position == RNG_BLOCK {
            self.rng.fill_bytes(&mut self.block);
            self.position = 0;
        }
        let byte = self.block[self.position];
        self.position += 1;
        self.remaining -= 1;
        Ok(Some(byte))
    }
}
