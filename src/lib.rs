//! gaussparse - convert Gaussian output logs into structured JSON records
//!
//! A batch run discovers log files, extracts each one on a worker pool and
//! writes the records either as one JSON array or one file per log. Failed
//! files still produce a record carrying the error message.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod files;
pub mod json;
pub mod logfile;
pub mod logging;
pub mod notify;
pub mod output;
pub mod record;

pub use config::Config;
pub use dispatch::Dispatcher;
pub use logfile::{GaussianParser, LogParser};
pub use record::{Extractor, Record};
