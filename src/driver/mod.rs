//! Stream driver: pulls bytes from a source and feeds the estimator.
//!
//! A [`StreamDriver`] is built from a validated configuration (Ready),
//! consumed by [`StreamDriver::run`] (Running) and turned into a
//! [`FinishedRun`] once the source is exhausted (Finalized). Dropping the
//! finished run releases the context table.

mod config;
mod stream;

pub use config::{DiagnosticsConfig, DriverConfig, FileConfig, HealthConfig};
pub use stream::{FinishedRun, StreamDriver};

use crate::estimator::{ConfigError, EstimatorError};
use crate::source::SourceError;
use thiserror::Error;

/// Errors that end a run. None of them leave partial output behind.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The estimator could not be built.
    #[error(transparent)]
    Estimator(#[from] EstimatorError),
    /// The input could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),
}
