//! The bit-feeding loop.

use super::{DiagnosticsConfig, DriverConfig, DriverError};
use crate::analysis::{HealthMetrics, HealthMonitor};
use crate::estimator::{EntropyEstimate, EntropyEstimator};
use crate::model::ContextModel;
use crate::source::ByteSource;
use std::io::{self, Write};

/// A configured, allocated analysis waiting for its input.
pub struct StreamDriver<S> {
    source: S,
    estimator: EntropyEstimator,
    monitor: HealthMonitor,
    diagnostics: DiagnosticsConfig,
}

impl<S: ByteSource> StreamDriver<S> {
    /// Validates `config` and allocates the estimator.
    ///
    /// Nothing is read from `source` until [`run`](Self::run).
    pub fn new(config: &DriverConfig, source: S) -> Result<Self, DriverError> {
        config.validate()?;
        let estimator = EntropyEstimator::new(&config.estimator)?;
        let monitor = HealthMonitor::with_streak_requirement(
            config.health.thresholds(),
            config.health.min_healthy_streak,
        );

        Ok(Self {
            source,
            estimator,
            monitor,
            diagnostics: config.diagnostics.clone(),
        })
    }

    /// Consumes the whole source, one bit at a time, most significant bit
    /// of each byte first.
    pub fn run(mut self) -> Result<FinishedRun, DriverError> {
        let mask = self.diagnostics.checkpoint_mask();

        while let Some(byte) = self.source.next_byte()? {
            for shift in (0..8).rev() {
                self.estimator.add_bit((byte >> shift) & 1 == 1);
                if self.estimator.total_bits() & mask == 0 {
                    self.checkpoint();
                }
            }
        }

        let estimate = self.estimator.estimate();
        self.monitor.analyze(&estimate);
        tracing::info!(
            total_bits = estimate.total_bits,
            entropy_per_bit = estimate.entropy_per_bit,
            context_rescales = estimate.rescales.contexts,
            sample_rescales = estimate.rescales.samples,
            healthy = self.monitor.is_healthy(),
            "Stream exhausted"
        );

        Ok(FinishedRun {
            estimator: self.estimator,
            monitor: self.monitor,
        })
    }

    fn checkpoint(&mut self) {
        let estimate = self.estimator.estimate();
        if self.diagnostics.enabled {
            match estimate.ones_percent {
                Some(ones) => tracing::info!(
                    total_bits = estimate.total_bits,
                    "Estimated entropy per bit: {:.6}, ones: {:.4}%",
                    estimate.entropy_per_bit,
                    ones
                ),
                None => tracing::info!(
                    total_bits = estimate.total_bits,
                    "Estimated entropy per bit: {:.6}",
                    estimate.entropy_per_bit
                ),
            }
        }
        self.monitor.analyze(&estimate);
    }
}

/// A completed analysis. Estimates can be queried until it is dropped.
pub struct FinishedRun {
    estimator: EntropyEstimator,
    monitor: HealthMonitor,
}

impl FinishedRun {
    /// Final estimate of the run.
    pub fn estimate(&self) -> EntropyEstimate {
        self.estimator.estimate()
    }

    /// Health metrics after the final check.
    pub fn health(&self) -> &HealthMetrics {
        self.monitor.metrics()
    }

    /// Returns true if the source ended the run healthy.
    pub fn is_healthy(&self) -> bool {
        self.monitor.is_healthy()
    }

    /// The context model as left at end of stream.
    pub fn model(&self) -> &ContextModel {
        self.estimator.model()
    }

    /// Writes one `<context> ones:<n> zeros:<n>` line per context.
    pub fn dump_stats<W: Write>(&self, mut out: W) -> io::Result<()> {
        for (context, counts) in self.estimator.model().iter() {
            writeln!(out, "{:x} ones:{} zeros:{}", context, counts.ones, counts.zeros)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::ConfigError;
    use crate::source::{RngSource, SliceSource, SourceError};
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    struct BrokenSource {
        good_bytes: u32,
    }

    impl ByteSource for BrokenSource {
        fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
            if self.good_bytes == 0 {
                return Err(SourceError::Read {
                    origin: "broken".into(),
                    offset: 3,
                    source: io::Error::new(io::ErrorKind::UnexpectedEof, "cable cut"),
                });
            }
            self.good_bytes -= 1;
            Ok(Some(0x5A))
        }
    }

    fn run_bytes(context_bits: u8, data: &[u8]) -> FinishedRun {
        StreamDriver::new(&DriverConfig::new(context_bits), SliceSource::new(data))
            .unwrap()
            .run()
            .unwrap()
    }

    #[test]
    fn test_rejects_bad_context_length() {
        let data = [0u8; 4];
        for n in [0u8, 31] {
            let result = StreamDriver::new(&DriverConfig::new(n), SliceSource::new(&data));
            assert!(matches!(
                result,
                Err(DriverError::Config(ConfigError::ContextLength(_)))
            ));
        }
    }

    #[test]
    fn test_matches_direct_feeding() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i * 37 % 251) as u8).collect();
        let finished = run_bytes(6, &data);

        let mut direct = EntropyEstimator::with_context_bits(6).unwrap();
        direct.add_bytes(&data);
        assert_eq!(finished.estimate(), direct.estimate());
    }

    #[test]
    fn test_degenerate_source_flagged_unhealthy() {
        let finished = run_bytes(8, &vec![0x00u8; 100_000]);
        assert!(finished.estimate().entropy_per_bit < 0.01);
        assert!(!finished.is_healthy());
    }

    #[test]
    fn test_random_source_healthy() {
        let config = DriverConfig::new(8);
        let source = RngSource::new(ChaCha20Rng::seed_from_u64(3), 100_000);
        let finished = StreamDriver::new(&config, source).unwrap().run().unwrap();

        let estimate = finished.estimate();
        assert!(estimate.entropy_per_bit > 0.9, "{estimate:?}");
        assert_eq!(estimate.total_bits, 800_000);
        assert!(finished.is_healthy());
    }

    #[test]
    fn test_checkpoints_feed_health_monitor() {
        let mut config = DriverConfig::new(4).with_diagnostics(true);
        config.diagnostics.interval_log2 = 10;
        let data = vec![0xAAu8; 1024];

        let finished = StreamDriver::new(&config, SliceSource::new(&data))
            .unwrap()
            .run()
            .unwrap();

        // 8192 bits: eight checkpoints plus the final check
        assert_eq!(finished.health().total_checks, 9);
        assert!(finished.estimate().entropy_per_bit < 0.01);
    }

    #[test]
    fn test_source_error_aborts_run() {
        let source = BrokenSource { good_bytes: 3 };
        let driver = StreamDriver::new(&DriverConfig::new(8), source).unwrap();
        assert!(matches!(
            driver.run(),
            Err(DriverError::Source(SourceError::Read { offset: 3, .. }))
        ));
    }

    #[test]
    fn test_empty_source() {
        let finished = run_bytes(8, &[]);
        let estimate = finished.estimate();
        assert_eq!(estimate.total_bits, 0);
        assert_eq!(estimate.entropy_per_bit, 0.0);
        assert_eq!(estimate.branching_factor, 1.0);
    }

    #[test]
    fn test_dump_stats_lists_every_context() {
        let finished = run_bytes(2, &[0b1100_1100]);
        let mut out = Vec::new();
        finished.dump_stats(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "0 ones:2 zeros:0");
        assert_eq!(lines[3], "3 ones:0 zeros:2");
    }
}
