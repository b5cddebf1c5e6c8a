//! Bit Entropy CLI
//!
//! Estimates the entropy per bit of a binary file produced by a hardware
//! random number generator.

use bit_entropy::{
    driver::{DriverConfig, FileConfig, StreamDriver},
    metrics::{MetricsRegistry, MetricsSnapshot},
    source::{ByteSource, FileSource, ReaderSource},
};
use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Estimate the entropy per bit of a raw TRNG bit stream.
#[derive(Debug, Parser)]
#[command(name = "predict", version)]
struct Cli {
    /// Number of previous bits used to predict the next bit (1 to 30).
    #[arg(value_name = "N")]
    context_bits: u8,

    /// Binary file of random data to be tested, `-` for standard input.
    /// Bits are shifted in MSB to LSB in each byte.
    #[arg(value_name = "DATAFILE")]
    datafile: PathBuf,

    /// Log the running estimate every 2^20 bits.
    #[arg(long)]
    debug: bool,

    /// Print the per-context zero/one counts after the estimate.
    #[arg(long)]
    dump_stats: bool,

    /// TOML file with limits, diagnostics and health settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write final metrics in Prometheus text format to FILE.
    #[arg(long, value_name = "FILE")]
    metrics_file: Option<PathBuf>,

    /// Exit with status 2 if the source is judged unhealthy.
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not usage errors
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let file_config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::from(1);
            }
        },
        None => FileConfig::default(),
    };
    let mut config = DriverConfig::from_file_config(cli.context_bits, file_config);
    if cli.debug {
        config.diagnostics.enabled = true;
    }

    // Initialize logging once diagnostics are settled; stdout is reserved
    // for the report
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(env_filter(rust_log.as_deref(), &config))
        .init();

    if let Err(e) = config.validate() {
        eprintln!("{}\nRun `predict --help` for usage.", e);
        return ExitCode::from(1);
    }

    let source: Box<dyn ByteSource> = if cli.datafile.as_os_str() == "-" {
        Box::new(ReaderSource::stdin())
    } else {
        match FileSource::open(&cli.datafile) {
            Ok(source) => Box::new(source),
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::from(1);
            }
        }
    };

    info!(
        "bit-entropy v{}: N = {}, input {}",
        bit_entropy::VERSION,
        cli.context_bits,
        cli.datafile.display()
    );

    let run = match StreamDriver::new(&config, source).and_then(StreamDriver::run) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    let mut stdout = BufWriter::new(io::stdout().lock());
    let written = writeln!(stdout, "{}", run.estimate())
        .and_then(|()| {
            if cli.dump_stats {
                run.dump_stats(&mut stdout)
            } else {
                Ok(())
            }
        })
        .and_then(|()| stdout.flush());
    if let Err(e) = written {
        eprintln!("failed to write report: {}", e);
        return ExitCode::from(1);
    }

    if let Some(path) = &cli.metrics_file {
        let result = MetricsRegistry::new().and_then(|registry| {
            registry.update(&MetricsSnapshot::from_run(&run));
            registry.write_to(path)
        });
        if let Err(e) = result {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    }

    if !run.is_healthy() {
        if let Some(violation) = &run.health().last_violation {
            warn!("Entropy source unhealthy: {}", violation);
        }
        if cli.strict {
            return ExitCode::from(2);
        }
    }

    ExitCode::SUCCESS
}

/// `RUST_LOG` wins when set, non-empty and valid; otherwise INFO with diagnostics
/// enabled, WARN without.
fn env_filter(rust_log: Option<&str>, config: &DriverConfig) -> EnvFilter {
    let from_env = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok());
    if let Some(filter) = from_env {
        return filter;
    }
    let level = if config.diagnostics.enabled {
        Level::INFO
    } else {
        Level::WARN
    };
    EnvFilter::default().add_directive(level.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_diagnostics_from_file_raise_level() {
        let file = FileConfig::from_toml("[diagnostics]\nenabled = true").unwrap();
        let config = DriverConfig::from_file_config(8, file);
        assert_eq!(
            env_filter(None, &config).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }

    #[test]
    fn test_quiet_by_default() {
        let config = DriverConfig::new(8);
        assert_eq!(
            env_filter(None, &config).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }

    #[test]
    fn test_rust_log_overrides() {
        let config = DriverConfig::new(8);
        assert_eq!(
            env_filter(Some("debug"), &config).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        // Empty or unparsable values fall back to the configured level
        for rust_log in ["", "!!!"] {
            assert_eq!(
                env_filter(Some(rust_log), &config).max_level_hint(),
                Some(LevelFilter::WARN)
            );
        }
    }
}
