//! Log parsers and the parsed-log handle they produce.
//!
//! The extraction pipeline only talks to the [`LogParser`] trait. A parser
//! reads one output file and reports whatever attributes it found as a
//! [`ParsedLog`]; every attribute is optional because different calculation
//! types print different sections.
//!
//! # Module Structure
//!
//! - [`array`] - n-dimensional numeric arrays used for parsed attributes
//! - [`gaussian`] - parser for Gaussian output logs

pub mod array;
pub mod gaussian;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use array::{NdArray, ShapeError};
pub use gaussian::GaussianParser;

use crate::json::Value;

/// Electronvolts per Hartree.
pub const EV_PER_HARTREE: f64 = 27.211386245988;

/// Errors raised while reading or interpreting a log file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// Attributes parsed from one log file.
///
/// Names follow the usual quantum-chemistry conventions. Energies in
/// `scfenergies` are electronvolts; coordinates are Angstrom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    pub metadata: BTreeMap<String, Value>,
    pub charge: Option<i32>,
    pub mult: Option<u32>,
    pub nbasis: Option<usize>,
    /// Atomic numbers, shape `[natoms]`.
    pub atomnos: Option<NdArray<i64>>,
    /// Geometry frames, shape `[nframes, natoms, 3]`.
    pub atomcoords: Option<NdArray<f64>>,
    /// One SCF energy per converged SCF cycle, shape `[nsteps]`.
    pub scfenergies: Option<NdArray<f64>>,
    /// Multipole moments: reference point, dipole, then higher orders.
    pub moments: Option<Vec<Vec<f64>>>,
    /// Per-atom Mulliken charges, one frame per population analysis.
    pub mulliken: Option<Vec<Vec<f64>>>,
    pub vibfreqs: Option<NdArray<f64>>,
    pub vibirs: Option<NdArray<f64>>,
    pub vibfconsts: Option<NdArray<f64>>,
    pub vibredmass: Option<NdArray<f64>>,
    /// Zero-point vibrational energy in Hartree.
    pub zpve: Option<f64>,
}

/// A parser for one family of output logs.
///
/// Implementations must be callable from several worker threads at once.
pub trait LogParser: Send + Sync {
    /// Human-readable name for logs and error messages.
    fn name(&self) -> &'static str;

    /// Parse the file at `path`.
    ///
    /// Returns `Ok(None)` when the file is not an output log this parser
    /// understands.
    fn parse(&self, path: &Path) -> Result<Option<ParsedLog>, ParseError>;
}
