//! Logging Infrastructure
//!
//! `tracing` subscriber setup: `RUST_LOG` wins over the configured level,
//! console output is plain or JSON, and a daily rolling file is added when a
//! log directory is given.

use std::path::Path;

use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const LOG_FILE_PREFIX: &str = "admin-server";

/// Initialize the global logger
///
/// Fails if a global subscriber is already set or the log directory cannot
/// be created.
pub fn init_logger(level: &str, json: bool, log_dir: Option<&Path>) -> Result<(), LoggerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    layers.push(if json {
        fmt::layer().json().with_current_span(false).boxed()
    } else {
        fmt::layer().with_target(false).boxed()
    });

    if let Some(dir) = log_dir {
        let appender = file_appender(dir)?;
        layers.push(fmt::layer().json().with_ansi(false).with_writer(appender).boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;
    Ok(())
}

/// Daily rolling file appender, creating the directory if needed
fn file_appender(dir: &Path) -> Result<RollingFileAppender, LoggerError> {
    std::fs::create_dir_all(dir)?;
    Ok(rolling::daily(dir, LOG_FILE_PREFIX))
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Failed to create log directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to install logger: {0}")]
    Init(#[from] TryInitError),
}
