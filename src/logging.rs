//! `tracing` setup
//!
//! Output goes to stderr, or to a file through a non-blocking
//! `tracing-appender` writer when [`LogConfig::file`] is set. `RUST_LOG`
//! overrides the configured level.

use std::error::Error;
use std::path::Path;

use thiserror::Error;
use tracing::error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::LogConfig;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Install the global subscriber.
///
/// Returns the file writer guard when logging to a file; it must be kept
/// alive until exit or buffered lines are lost.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = build_filter(std::env::var("RUST_LOG").ok(), &config.level)?;

    let (writer, guard) = match &config.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(config.file.is_none());
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry.with(layer.json()).try_init()?;
    } else {
        registry.with(layer).try_init()?;
    }

    Ok(guard)
}

/// Log an error with its full chain of causes as structured fields
pub fn report_error(context: &str, err: &(dyn Error + 'static)) {
    let causes: Vec<String> = std::iter::successors(err.source(), |&e| e.source())
        .map(|e| e.to_string())
        .collect();
    error!(error = %err, causes = ?causes, "{}", context);
}

fn build_filter(rust_log: Option<String>, level: &str) -> Result<EnvFilter, LoggingError> {
    let directives = rust_log
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| level.to_string());
    Ok(EnvFilter::try_new(directives)?)
}

fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)?;

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    Ok(tracing_appender::non_blocking(file))
}
