//! Filesystem layout: locating input logs and naming output files.
//!
//! - [`discover`] - resolve a directory and glob pattern into input paths
//! - [`naming`] - derive output file names from input paths

pub mod discover;
pub mod naming;

pub use discover::{discover, DiscoveryError};
pub use naming::{separate_output_name, sibling_output_path, FilenameError};
