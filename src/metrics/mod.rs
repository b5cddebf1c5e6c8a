//! Prometheus metrics for entropy monitoring.
//!
//! The final state of a run can be encoded in Prometheus text format, for
//! example to be picked up by a node exporter textfile collector.
//!
//! # Metrics Exposed
//!
//! ## Estimate
//! - `bit_entropy_entropy_per_bit` - Estimated entropy per bit
//! - `bit_entropy_branching_factor` - Estimated branching factor K
//! - `bit_entropy_ones_percent` - Percentage of ones after warm-up
//!
//! ## Counters
//! - `bit_entropy_bits_total` - Bits processed
//! - `bit_entropy_entropy_bits` - Entropy bits accumulated (after rescaling)
//! - `bit_entropy_bits_sampled` - Bits sampled (after rescaling)
//! - `bit_entropy_rescales_total{kind}` - Rescalings by kind
//!
//! ## Health
//! - `bit_entropy_health_status` - 1 if healthy, 0 otherwise
//! - `bit_entropy_health_checks_total` - Health checks performed
//!
//! # Example
//!
//! ```
//! use bit_entropy::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     entropy_per_bit: 0.998,
//!     branching_factor: 1.997,
//!     total_bits: 800_000,
//!     is_healthy: true,
//!     ..Default::default()
//! };
//!
//! registry.update(&snapshot);
//! assert!(registry.encode().unwrap().contains("bit_entropy_health_status 1"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
