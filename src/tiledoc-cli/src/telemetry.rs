//! Logging setup for the command line tool
//!
//! - JSON formatted logs to a rotating file
//! - Human-readable output on stderr, so stdout stays clean for JSON results

use anyhow::Result;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const DEFAULT_FILTER: &str = "tiledoc=info,tiledoc_rs=info,tiledoc_core=info";

/// Initialize logging
///
/// Returns a guard that must be kept alive to ensure logs are flushed
pub fn init_telemetry(log_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    // Rotates when the file reaches 10MB or daily, whichever comes first
    let file_appender = RollingFileAppender::new(
        log_dir.join("tiledoc.log"),
        RollingConditionBasic::new()
            .daily()
            .max_size(10 * 1024 * 1024),
        9,
    )?;

    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("tiledoc=debug,tiledoc_rs=debug,tiledoc_core=debug")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    });

    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_current_span(true)
        .with_target(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::debug!("Logging to {:?}", log_dir);

    Ok(guard)
}
