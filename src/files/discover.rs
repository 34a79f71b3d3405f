//! Input discovery.
//!
//! Matches a glob pattern inside one directory and returns regular files in
//! lexicographic order, so repeated runs over an unchanged directory process
//! files in the same order.

use std::path::{Path, PathBuf};

use tracing::warn;

/// Errors that stop a run before any file is processed.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Input directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Input path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Find files in `directory` matching `pattern`, sorted by path.
///
/// An empty result is not an error. Glob metacharacters in `directory` itself
/// are matched literally.
pub fn discover(directory: &Path, pattern: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !directory.exists() {
        return Err(DiscoveryError::DirectoryNotFound(directory.to_path_buf()));
    }
    if !directory.is_dir() {
        return Err(DiscoveryError::NotADirectory(directory.to_path_buf()));
    }

    let escaped = glob::Pattern::escape(&directory.to_string_lossy());
    let full = Path::new(&escaped).join(pattern);
    let entries =
        glob::glob(&full.to_string_lossy()).map_err(|source| DiscoveryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn returns_sorted_matches() {
        let dir = TempDir::new().unwrap();
        for name in ["c.log", "a.log", "b.log", "notes.txt"] {
            touch(dir.path(), name);
        }

        let files = discover(dir.path(), "*.log").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.log", "b.log", "c.log"]);
    }

    #[test]
    fn no_matches_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        for name in ["a.out", "b.txt", "c.dat"] {
            touch(dir.path(), name);
        }
        assert!(discover(dir.path(), "*.log").unwrap().is_empty());
    }

    #[test]
    fn skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested.log")).unwrap();
        touch(dir.path(), "real.log");
        let files = discover(dir.path(), "*.log").unwrap();
        assert_eq!(files, vec![dir.path().join("real.log")]);
    }

    #[test]
    fn directory_metacharacters_are_literal() {
        let dir = TempDir::new().unwrap();
        let odd = dir.path().join("run[1]");
        fs::create_dir(&odd).unwrap();
        touch(&odd, "x.log");
        assert_eq!(discover(&odd, "*.log").unwrap(), vec![odd.join("x.log")]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let err = discover(&missing, "*.log").unwrap_err();
        assert!(matches!(err, DiscoveryError::DirectoryNotFound(_)));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "file.log");
        let err = discover(&dir.path().join("file.log"), "*.log").unwrap_err();
        assert!(matches!(err, DiscoveryError::NotADirectory(_)));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = discover(dir.path(), "[").unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidPattern { .. }));
    }
}
