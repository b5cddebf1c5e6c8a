//! Entropy health monitoring.
//!
//! Tracks entropy quality over the checkpoints of a run and implements
//! fail-closed behavior when quality degrades.

use super::threshold::{QualityThresholds, ThresholdViolation};
use crate::estimator::EntropyEstimate;

/// Current health status of the entropy source.
#[derive(Debug, Clone)]
pub struct HealthMetrics {
    /// Most recent estimate checked.
    pub latest: Option<EntropyEstimate>,
    /// Whether the source is currently healthy.
    pub is_healthy: bool,
    /// Most recent violation, if any.
    pub last_violation: Option<ThresholdViolation>,
    /// Consecutive healthy checks.
    pub consecutive_healthy: u64,
    /// Consecutive unhealthy checks.
    pub consecutive_unhealthy: u64,
    /// Total checks performed.
    pub total_checks: u64,
}

impl Default for HealthMetrics {
    fn default() -> Self {
        Self {
            latest: None,
            is_healthy: false, // Fail-closed: unhealthy until proven otherwise
            last_violation: None,
            consecutive_healthy: 0,
            consecutive_unhealthy: 0,
            total_checks: 0,
        }
    }
}

/// Monitors entropy health over time.
///
/// The source is reported healthy only after a streak of passing checks,
/// and unhealthy as soon as one check fails.
pub struct HealthMonitor {
    thresholds: QualityThresholds,
    metrics: HealthMetrics,
    /// Required consecutive healthy checks to become healthy.
    required_healthy_streak: u64,
}

impl HealthMonitor {
    /// Creates a monitor with a custom healthy streak requirement.
    pub fn with_streak_requirement(thresholds: QualityThresholds, streak: u64) -> Self {
        Self {
            thresholds,
            metrics: HealthMetrics::default(),
            required_healthy_streak: streak.max(1),
        }
    }

    /// Checks an estimate and updates health status.
    pub fn analyze(&mut self, estimate: &EntropyEstimate) -> &HealthMetrics {
        self.metrics.total_checks += 1;

        match self.thresholds.check(estimate) {
            Ok(()) => {
                self.metrics.consecutive_healthy += 1;
                self.metrics.consecutive_unhealthy = 0;
                self.metrics.last_violation = None;

                if self.metrics.consecutive_healthy >= self.required_healthy_streak {
                    if !self.metrics.is_healthy {
                        tracing::info!(
                            streak = self.metrics.consecutive_healthy,
                            entropy_per_bit = estimate.entropy_per_bit,
                            "Entropy source became healthy"
                        );
                    }
                    self.metrics.is_healthy = true;
                }

                tracing::trace!(
                    entropy_per_bit = estimate.entropy_per_bit,
                    ones_percent = ?estimate.ones_percent,
                    "Health check passed"
                );
            }
            Err(violation) => {
                self.metrics.consecutive_unhealthy += 1;
                self.metrics.consecutive_healthy = 0;

                if self.metrics.is_healthy {
                    tracing::warn!(
                        violation = %violation,
                        total_bits = estimate.total_bits,
                        "Entropy source became unhealthy"
                    );
                }
                self.metrics.last_violation = Some(violation);
                self.metrics.is_healthy = false;
            }
        }

        self.metrics.latest = Some(estimate.clone());
        &self.metrics
    }

    /// Returns current health metrics.
    pub fn metrics(&self) -> &HealthMetrics {
        &self.metrics
    }

    /// Returns true if the source is currently judged healthy.
    pub fn is_healthy(&self) -> bool {
        self.metrics.is_healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::EntropyEstimator;
    use rand_chacha::ChaCha20Rng;
    use rand_core::{RngCore, SeedableRng};

    fn good_estimate() -> EntropyEstimate {
        let mut data = vec![0u8; 4096];
        ChaCha20Rng::seed_from_u64(42).fill_bytes(&mut data);
        let mut estimator = EntropyEstimator::with_context_bits(2).unwrap();
        estimator.add_bytes(&data);
        estimator.estimate()
    }

    fn bad_estimate() -> EntropyEstimate {
        let mut estimator = EntropyEstimator::with_context_bits(2).unwrap();
        estimator.add_bytes(&[0xFFu8; 4096]);
        estimator.estimate()
    }

    #[test]
    fn test_starts_unhealthy() {
        let monitor = HealthMonitor::with_streak_requirement(QualityThresholds::permissive(), 1);
        assert!(!monitor.is_healthy());
    }

    #[test]
    fn test_fixture_estimates() {
        let permissive = QualityThresholds::permissive();
        assert!(good_estimate().entropy_per_bit > permissive.min_entropy_per_bit);
        assert!(bad_estimate().entropy_per_bit < 0.01);
    }

    #[test]
    fn test_becomes_healthy_after_streak() {
        let mut monitor =
            HealthMonitor::with_streak_requirement(QualityThresholds::permissive(), 2);

        // First good check: not healthy yet
        monitor.analyze(&good_estimate());
        assert!(!monitor.is_healthy());

        // Second good check: now healthy
        monitor.analyze(&good_estimate());
        assert!(monitor.is_healthy());
    }

    #[test]
    fn test_immediately_unhealthy_on_failure() {
        let mut monitor =
            HealthMonitor::with_streak_requirement(QualityThresholds::permissive(), 2);

        monitor.analyze(&good_estimate());
        monitor.analyze(&good_estimate());
        assert!(monitor.is_healthy());

        // Single collapsed checkpoint makes it unhealthy (fail-closed)
        let metrics = monitor.analyze(&bad_estimate());
        assert!(!metrics.is_healthy);
        assert!(matches!(
            metrics.last_violation,
            Some(ThresholdViolation::LowEntropy { .. })
        ));
        assert_eq!(metrics.total_checks, 3);
    }
}
