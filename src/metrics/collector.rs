//! Metrics collection and registry.

use crate::driver::FinishedRun;
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    /// The metrics file could not be written.
    #[error("failed to write metrics: {0}")]
    Io(#[from] std::io::Error),
}

/// A snapshot of run state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Estimated entropy per bit.
    pub entropy_per_bit: f64,
    /// Estimated branching factor.
    pub branching_factor: f64,
    /// Percentage of ones, if counted yet.
    pub ones_percent: Option<f64>,
    /// Bits processed.
    pub total_bits: u64,
    /// Entropy bits accumulated.
    pub entropy_bits: u64,
    /// Bits sampled.
    pub bits_sampled: u64,
    /// Context table halvings.
    pub context_rescales: u64,
    /// Entropy/sample counter halvings.
    pub sample_rescales: u64,
    /// Bias counter halvings.
    pub bias_rescales: u64,
    /// Whether the source is currently healthy.
    pub is_healthy: bool,
    /// Health checks performed.
    pub health_checks: u64,
}

impl MetricsSnapshot {
    /// Creates a snapshot from a finished run.
    pub fn from_run(run: &FinishedRun) -> Self {
        let estimate = run.estimate();
        let health = run.health();

        Self {
            entropy_per_bit: estimate.entropy_per_bit,
            branching_factor: estimate.branching_factor,
            ones_percent: estimate.ones_percent,
            total_bits: estimate.total_bits,
            entropy_bits: estimate.entropy_bits,
            bits_sampled: estimate.bits_sampled,
            context_rescales: estimate.rescales.contexts,
            sample_rescales: estimate.rescales.samples,
            bias_rescales: estimate.rescales.bias,
            is_healthy: health.is_healthy,
            health_checks: health.total_checks,
        }
    }
}

/// Prometheus metrics registry for entropy monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Estimate
    entropy_per_bit: Gauge,
    branching_factor: Gauge,
    ones_percent: Gauge,

    // Counters
    bits_total: IntCounter,
    entropy_bits: IntGauge,
    bits_sampled: IntGauge,
    rescales_total: IntCounterVec,

    // Health
    health_status: IntGauge,
    health_checks_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all entropy metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let entropy_per_bit = Gauge::new(
            "bit_entropy_entropy_per_bit",
            "Estimated entropy per bit of the analyzed stream",
        )?;
        let branching_factor = Gauge::new(
            "bit_entropy_branching_factor",
            "Estimated branching factor K (2^entropy_per_bit)",
        )?;
        let ones_percent = Gauge::new(
            "bit_entropy_ones_percent",
            "Percentage of ones observed after warm-up",
        )?;

        let bits_total = IntCounter::new("bit_entropy_bits_total", "Total bits processed")?;
        let entropy_bits = IntGauge::new(
            "bit_entropy_entropy_bits",
            "Accumulated entropy bits after rescaling",
        )?;
        let bits_sampled = IntGauge::new(
            "bit_entropy_bits_sampled",
            "Sampled bits after rescaling",
        )?;
        let rescales_total = IntCounterVec::new(
            Opts::new("bit_entropy_rescales_total", "Counter halvings by kind"),
            &["kind"],
        )?;

        let health_status = IntGauge::new(
            "bit_entropy_health_status",
            "Current health status (1=healthy, 0=unhealthy)",
        )?;
        let health_checks_total = IntCounter::new(
            "bit_entropy_health_checks_total",
            "Total health checks performed",
        )?;

        registry.register(Box::new(entropy_per_bit.clone()))?;
        registry.register(Box::new(branching_factor.clone()))?;
        registry.register(Box::new(ones_percent.clone()))?;
        registry.register(Box::new(bits_total.clone()))?;
        registry.register(Box::new(entropy_bits.clone()))?;
        registry.register(Box::new(bits_sampled.clone()))?;
        registry.register(Box::new(rescales_total.clone()))?;
        registry.register(Box::new(health_status.clone()))?;
        registry.register(Box::new(health_checks_total.clone()))?;

        Ok(Self {
            registry,
            entropy_per_bit,
            branching_factor,
            ones_percent,
            bits_total,
            entropy_bits,
            bits_sampled,
            rescales_total,
            health_status,
            health_checks_total,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.entropy_per_bit.set(snapshot.entropy_per_bit);
        self.branching_factor.set(snapshot.branching_factor);
        // NaN until the warm-up is over, so it is not read as all zeros
        self.ones_percent.set(snapshot.ones_percent.unwrap_or(f64::NAN));

        // For counters, we need to increment by the difference
        bump(&self.bits_total, snapshot.total_bits);
        self.entropy_bits.set(snapshot.entropy_bits as i64);
        self.bits_sampled.set(snapshot.bits_sampled as i64);
        for (kind, value) in [
            ("contexts", snapshot.context_rescales),
            ("samples", snapshot.sample_rescales),
            ("bias", snapshot.bias_rescales),
        ] {
            bump(&self.rescales_total.with_label_values(&[kind]), value);
        }

        self.health_status.set(i64::from(snapshot.is_healthy));
        bump(&self.health_checks_total, snapshot.health_checks);
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Writes the text encoding to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), MetricsError> {
        std::fs::write(path.as_ref(), self.encode()?)?;
        tracing::debug!(path = %path.as_ref().display(), "Wrote metrics");
        Ok(())
    }
}

fn bump(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverConfig, StreamDriver};
    use crate::source::SliceSource;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            entropy_per_bit: 0.5,
            branching_factor: 0.5f64.exp2(),
            ones_percent: Some(49.5),
            total_bits: 4096,
            entropy_bits: 2048,
            bits_sampled: 4096,
            context_rescales: 2,
            sample_rescales: 0,
            bias_rescales: 0,
            is_healthy: true,
            health_checks: 3,
        };

        registry.update(&snapshot);
        // Counters never go backwards
        registry.update(&MetricsSnapshot {
            total_bits: 10,
            ..snapshot.clone()
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("bit_entropy_health_status 1"));
        assert!(output.contains("bit_entropy_entropy_per_bit 0.5"));
        assert!(output.contains("bit_entropy_bits_total 4096"));
        assert!(output.contains("bit_entropy_rescales_total{kind=\"contexts\"} 2"));
    }

    #[test]
    fn test_ones_percent_unknown_before_warmup() {
        let data = [0x00u8; 8];
        let run = StreamDriver::new(&DriverConfig::new(8), SliceSource::new(&data))
            .unwrap()
            .run()
            .unwrap();
        let snapshot = MetricsSnapshot::from_run(&run);
        assert_eq!(snapshot.ones_percent, None);

        let registry = MetricsRegistry::new().unwrap();
        registry.update(&snapshot);
        let output = registry.encode().unwrap();
        assert!(output.contains("bit_entropy_ones_percent NaN"));
        assert!(!output.contains("bit_entropy_ones_percent 0"));
    }

    #[test]
    fn test_snapshot_from_run() {
        let data = vec![0x00u8; 20_000];
        let run = StreamDriver::new(&DriverConfig::new(8), SliceSource::new(&data))
            .unwrap()
            .run()
            .unwrap();

        let snapshot = MetricsSnapshot::from_run(&run);
        assert_eq!(snapshot.total_bits, 160_000);
        assert!(snapshot.context_rescales > 0);
        assert!(snapshot.sample_rescales > 0);
        assert!(!snapshot.is_healthy);
        assert_eq!(snapshot.health_checks, 1);

        let registry = MetricsRegistry::new().unwrap();
        registry.update(&snapshot);
        let output = registry.encode().unwrap();
        assert!(output.contains("bit_entropy_health_status 0"));
        assert!(output.contains("bit_entropy_bits_total 160000"));
    }

    #[test]
    fn test_write_to_file() {
        let registry = MetricsRegistry::new().unwrap();
        let path = std::env::temp_dir().join(format!("bit-entropy-metrics-{}.prom", std::process::id()));
        registry.write_to(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(written.contains("bit_entropy_entropy_per_bit"));
    }
}
