//! Output file naming.
//!
//! Per-file outputs are named after the source file's stem plus a fixed
//! suffix, e.g. `water.log` becomes `water.cclib.json`.

use std::path::{Path, PathBuf};

/// Default suffix for per-file JSON outputs.
pub const DEFAULT_SUFFIX: &str = ".cclib.json";

/// Maximum filename length for most filesystems.
const MAX_FILENAME_LENGTH: usize = 255;

/// Fallback stem for paths without a file name (e.g. `/` or `..`).
const FALLBACK_STEM: &str = "output";

/// Errors that can occur when deriving an output name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    #[error("Filename too long: {length} characters (max {max})")]
    TooLong { length: usize, max: usize },
}

/// Output file name for `source` in separate mode: `<stem><suffix>`.
pub fn separate_output_name(source: &Path, suffix: &str) -> Result<String, FilenameError> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());
    let name = format!("{}{}", stem, suffix);
    validate_length(&name)?;
    Ok(name)
}

/// Output path next to `source` with its extension replaced by `suffix`.
pub fn sibling_output_path(source: &Path, suffix: &str) -> Result<PathBuf, FilenameError> {
    let name = separate_output_name(source, suffix)?;
    Ok(source.with_file_name(name))
}

/// Validates that a final filename doesn't exceed filesystem limits.
pub fn validate_length(filename: &str) -> Result<(), FilenameError> {
    if filename.len() > MAX_FILENAME_LENGTH {
        Err(FilenameError::TooLong {
            length: filename.len(),
            max: MAX_FILENAME_LENGTH,
        })
    } else {
        Ok(())
    }
}
