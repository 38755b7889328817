//! Tracing setup.
//!
//! stdout carries the MCP protocol, so logs go to stderr or to a file.

use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Builds the filter: `RUST_LOG` if set, otherwise the config default.
#[must_use]
pub fn build_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()))
}

/// Installs the global subscriber.
///
/// With a log file configured, records are appended to it through a
/// background writer; the returned guard flushes it on drop and must be held
/// for the life of the process.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(config);

    match &config.log_file {
        Some(path) => {
            let appender = file_appender(path)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            install(filter, writer, false)?;
            Ok(Some(guard))
        }
        None => {
            install(filter, std::io::stderr, true)?;
            Ok(None)
        }
    }
}

fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    Ok(RollingFileAppender::new(Rotation::NEVER, dir, file_name))
}

fn install<W>(filter: EnvFilter, writer: W, ansi: bool) -> Result<()>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
