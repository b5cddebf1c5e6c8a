//! Entropy health monitoring.
//!
//! Turns running entropy estimates into a healthy/unhealthy verdict.
//! These are sanity checks for detecting entropy collapse, not proofs of
//! entropy quality.

mod health;
mod threshold;

pub use health::{HealthMetrics, HealthMonitor};
pub use threshold::{QualityThresholds, ThresholdViolation};
