//! Bit Entropy Estimation Library
//!
//! Estimates the entropy per bit of a raw bit stream from a hardware noise
//! source (ring oscillators, zener diodes, infinite noise multipliers),
//! assuming the source has a single hidden state variable updated with
//! noise between bits. Meant as a cheap, continuously-running health
//! monitor that catches entropy collapse.
//!
//! # Architecture
//!
//! ```text
//! source → driver → model → estimator → guard
//!                     ↑                   │
//!                     └──── rescaling ────┘
//!            driver → analysis (health checkpoints) → metrics
//! ```
//!
//! Each bit is predicted from the previous N bits by an order-N context
//! model. The self-information of every observed bit accumulates into a
//! count of entropy bits; dividing by the number of bits sampled gives the
//! estimate. Counters are halved periodically so the estimator can run
//! forever on a live stream.
//!
//! # Limitations
//!
//! - **Single state variable only**: sources with additional hidden state,
//!   such as the bit position within bytes from an ADC, are overestimated
//! - **No certification**: this is a health monitor, not a test battery
//!
//! # Example
//!
//! ```
//! use bit_entropy::{DriverConfig, SliceSource, StreamDriver};
//!
//! let data = vec![0xAAu8; 10_000];
//! let run = StreamDriver::new(&DriverConfig::new(4), SliceSource::new(&data))
//!     .unwrap()
//!     .run()
//!     .unwrap();
//!
//! // Alternating bits are perfectly predictable once learned
//! assert!(run.estimate().entropy_per_bit < 0.01);
//! println!("{}", run.estimate());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod driver;
pub mod estimator;
pub mod metrics;
pub mod model;
pub mod source;

// Re-export commonly used types at crate root
pub use analysis::{HealthMetrics, HealthMonitor, QualityThresholds};
pub use driver::{DriverConfig, DriverError, FileConfig, FinishedRun, StreamDriver};
pub use estimator::{EntropyEstimate, EntropyEstimator, EstimatorConfig, EstimatorError};
pub use model::{BitCounts, ContextModel};
pub use source::{ByteSource, FileSource, ReaderSource, SliceSource, SourceError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
