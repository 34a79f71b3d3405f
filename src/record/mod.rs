//! Per-file records and the extraction that builds them.
//!
//! A [`Record`] always names its source file and carries either an error
//! message or the full set of extracted [`Properties`], never both. On
//! serialization the outcome is flattened next to `file`:
//!
//! ```json
//! {"file": "broken.log", "error": "line 7: invalid number '-74.96##'"}
//! ```

mod extract;

pub use extract::{properties_from, ExtractError, Extractor};

use std::collections::BTreeMap;

use serde::Serialize;

use crate::json::Value;
use crate::logfile::NdArray;

/// Result of processing one source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Base name of the source file.
    pub file: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Either the failure message or the extracted properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Failed { error: String },
    Parsed(Box<Properties>),
}

impl Record {
    pub fn failed(file: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            outcome: Outcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn parsed(file: impl Into<String>, properties: Properties) -> Self {
        Self {
            file: file.into(),
            outcome: Outcome::Parsed(Box::new(properties)),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { error } => Some(error),
            Outcome::Parsed(_) => None,
        }
    }

    pub fn properties(&self) -> Option<&Properties> {
        match &self.outcome {
            Outcome::Parsed(properties) => Some(properties),
            Outcome::Failed { .. } => None,
        }
    }
}

/// Physical properties extracted from a successfully parsed log.
///
/// Every field is independently nullable; a missing section in the log leaves
/// the matching field as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Properties {
    pub metadata: BTreeMap<String, Value>,
    pub charge: Option<f64>,
    pub multiplicity: Option<i64>,
    pub nbasis: Option<usize>,
    pub natoms: Option<usize>,
    pub scf_energies_au: Option<Vec<f64>>,
    pub final_scf_energy_au: Option<f64>,
    pub vibrations: Vibrations,
    pub dipole_moment_debye: Option<Dipole>,
    pub mulliken_charges: Option<Vec<f64>>,
    pub zpe_au: Option<f64>,
    pub atom_numbers: Option<NdArray<i64>>,
    pub final_geometry_angstrom: Option<NdArray<f64>>,
}

/// Harmonic vibrational analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Vibrations {
    #[serde(rename = "frequencies_cm-1")]
    pub frequencies: Option<NdArray<f64>>,
    #[serde(rename = "ir_intensities_km/mol")]
    pub ir_intensities: Option<NdArray<f64>>,
    #[serde(rename = "force_constants_mDyneA")]
    pub force_constants: Option<NdArray<f64>>,
    #[serde(rename = "reduced_masses_amu")]
    pub reduced_masses: Option<NdArray<f64>>,
}

/// Dipole moment vector and its magnitude, in Debye.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dipole {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub total: f64,
}

impl Dipole {
    pub fn from_components(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            total: (x * x + y * y + z * z).sqrt(),
        }
    }
}
