//! Persisting records.
//!
//! Two modes, chosen once per run:
//!
//! - **Aggregate**: [`AggregateSink`] collects every record and writes one JSON
//!   array when the batch is done.
//! - **Separate**: [`SeparateSink`] writes each record to its own
//!   `<stem><suffix>` file as soon as it completes.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::OutputConfig;
use crate::files::{separate_output_name, FilenameError};
use crate::json;
use crate::record::Record;

/// Errors raised while writing output files.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Filename(#[from] FilenameError),
}

/// Receives records as workers complete them.
pub trait RecordSink {
    /// Accept the record produced for `source`.
    fn accept(&mut self, source: &Path, record: Record) -> Result<(), OutputError>;
}

/// Where and how a batch run writes its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    Aggregate { destination: PathBuf, sort: bool },
    Separate { directory: PathBuf, suffix: String },
}

impl OutputMode {
    /// Resolve the output mode against `base` (normally the working directory).
    ///
    /// An explicit destination only applies to aggregate mode.
    pub fn resolve(
        config: &OutputConfig,
        base: &Path,
        explicit: Option<PathBuf>,
        separate: bool,
        sort: bool,
    ) -> Self {
        let directory = base.join(&config.directory);
        if separate {
            if explicit.is_some() {
                warn!("--output is ignored in separate mode");
            }
            return OutputMode::Separate {
                directory,
                suffix: config.separate_suffix.clone(),
            };
        }
        let destination = explicit.unwrap_or_else(|| directory.join(&config.aggregate_file));
        OutputMode::Aggregate { destination, sort }
    }

    /// The file or directory output lands in.
    pub fn location(&self) -> &Path {
        match self {
            OutputMode::Aggregate { destination, .. } => destination,
            OutputMode::Separate { directory, .. } => directory,
        }
    }
}

/// Collects records in completion order for a single array write.
#[derive(Debug, Default)]
pub struct AggregateSink {
    records: Vec<Record>,
}

impl AggregateSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Order records by source file name.
    pub fn sort_by_file(&mut self) {
        self.records.sort_by(|a, b| a.file.cmp(&b.file));
    }

    /// Write all records as one JSON array. Returns the record count.
    pub fn write(&self, destination: &Path) -> Result<usize, OutputError> {
        write_json(destination, &self.records)?;
        info!(
            "Wrote {} records to {}",
            self.records.len(),
            destination.display()
        );
        Ok(self.records.len())
    }
}

impl RecordSink for AggregateSink {
    fn accept(&mut self, _source: &Path, record: Record) -> Result<(), OutputError> {
        self.records.push(record);
        Ok(())
    }
}

/// Writes each record to its own file inside one directory.
#[derive(Debug)]
pub struct SeparateSink {
    directory: PathBuf,
    suffix: String,
    written: HashSet<String>,
}

impl SeparateSink {
    /// Create the sink, creating `directory` if absent.
    pub fn create(directory: impl Into<PathBuf>, suffix: impl Into<String>) -> Result<Self, OutputError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|source| OutputError::Io {
            path: directory.clone(),
            source,
        })?;
        Ok(Self {
            directory,
            suffix: suffix.into(),
            written: HashSet::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Number of files written so far.
    pub fn count(&self) -> usize {
        self.written.len()
    }
}

impl RecordSink for SeparateSink {
    fn accept(&mut self, source: &Path, record: Record) -> Result<(), OutputError> {
        let name = separate_output_name(source, &self.suffix)?;
        let path = self.directory.join(&name);
        if !self.written.insert(name) {
            warn!(
                "{} overwrites output of another input with the same stem",
                path.display()
            );
        }
        write_json(&path, &record)
    }
}

/// Serialize `value` as indented JSON and write it to `path`, creating parent
/// directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), OutputError> {
    let text = json::to_pretty_string(value).map_err(|source| OutputError::Serialize {
        what: path.display().to_string(),
        source,
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
