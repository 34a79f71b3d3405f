//! Diagnostic log files.
//!
//! Library code only emits `tracing` events. Each binary calls [`init`] once
//! at startup, which routes INFO and above to the info log and ERROR alone to
//! the error log. Both files are opened in append mode.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, Layer};

use crate::config::LoggingConfig;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Install the global subscriber. Does nothing when logging is disabled.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    if let Some(subscriber) = subscriber(config)? {
        subscriber.try_init()?;
    }
    Ok(())
}

/// Build the two-file subscriber without installing it.
pub fn subscriber(
    config: &LoggingConfig,
) -> Result<Option<impl Subscriber + Send + Sync + 'static>, LoggingError> {
    if !config.enabled {
        return Ok(None);
    }

    let info = fmt::layer()
        .with_writer(Mutex::new(open_append(&config.info_log)?))
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::INFO);

    let errors = fmt::layer()
        .with_writer(Mutex::new(open_append(&config.error_log)?))
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::ERROR);

    Ok(Some(tracing_subscriber::registry().with(info).with(errors)))
}

fn open_append(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::Open {
            path: path.to_path_buf(),
            source,
        })
}
