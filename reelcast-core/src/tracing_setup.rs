//! Logging for the reelcast binary.
//!
//! Console output follows `--log-level` (or `REELCAST_LOG` when set). Every
//! run also writes a trace-level log so a resolution that came back empty
//! can be replayed host by host.

use std::fs::{File, create_dir_all};
use std::path::Path;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Environment variable overriding the console filter, e.g. `reelcast_extract=debug`.
pub const LOG_ENV: &str = "REELCAST_LOG";

/// Name of the per-run trace file inside the logs directory.
pub const RUN_LOG: &str = "reelcast-last-run.log";

/// Installs the global subscriber.
///
/// `logs_dir` defaults to `./logs`; the run log there is truncated first.
///
/// # Errors
/// Fails when the run log cannot be created or a subscriber is already set.
pub fn init_tracing(
    console_level: Level,
    logs_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let logs_dir = logs_dir.unwrap_or_else(|| Path::new("logs"));
    create_dir_all(logs_dir)?;
    let run_log = logs_dir.join(RUN_LOG);
    let file = File::create(&run_log)?;

    let console_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(console_level.to_string()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_writer(file)
                .with_filter(EnvFilter::new("trace")),
        )
        .try_init()?;

    tracing::debug!("Run log at {}", run_log.display());
    Ok(())
}

/// `--log-level` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliLogLevel {
    Error,
    Warn,
    Info,
    /// Includes per-embed dispatch details
    Debug,
    Trace,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_level_maps_onto_tracing_level() {
        assert_eq!(Level::from(CliLogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(CliLogLevel::Debug), Level::DEBUG);
    }

    #[test]
    fn test_run_log_is_created() {
        let dir = tempfile::tempdir().unwrap();
        // Another test in this binary may have installed the subscriber already.
        let _ = init_tracing(Level::WARN, Some(dir.path()));
        assert!(dir.path().join(RUN_LOG).exists());
    }
}
