//! Turn parsed logs into records.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error};

use super::{Dipole, Properties, Record, Vibrations};
use crate::logfile::{LogParser, ParseError, ParsedLog, EV_PER_HARTREE};

/// Errors from strict extraction of a single file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to parse the file: not a recognised output log")]
    NoData { parser: &'static str },
}

/// Runs a [`LogParser`] over files and maps its output onto [`Properties`].
///
/// Holds no per-call state, so one extractor can be shared by every worker.
#[derive(Clone)]
pub struct Extractor {
    parser: Arc<dyn LogParser>,
}

impl Extractor {
    pub fn new(parser: Arc<dyn LogParser>) -> Self {
        Self { parser }
    }

    /// Extract properties, failing when the parser errors or finds nothing.
    pub fn try_extract(&self, path: &Path) -> Result<Properties, ExtractError> {
        match self.parser.parse(path)? {
            Some(log) => Ok(properties_from(log)),
            None => Err(ExtractError::NoData {
                parser: self.parser.name(),
            }),
        }
    }

    /// Like [`try_extract`](Self::try_extract), wrapped in a record named after `path`.
    pub fn try_record(&self, path: &Path) -> Result<Record, ExtractError> {
        self.try_extract(path)
            .map(|properties| Record::parsed(base_name(path), properties))
    }

    /// Extract one record. Failures are captured in the record, never raised.
    pub fn extract(&self, path: &Path) -> Record {
        let file = base_name(path);
        match self.try_extract(path) {
            Ok(properties) => {
                debug!("Parsed {}", path.display());
                Record::parsed(file, properties)
            }
            Err(e) => {
                error!(
                    "[{} {} ERROR] Encountered error when parsing: {}",
                    self.parser.name(),
                    path.display(),
                    e
                );
                Record::failed(file, e.to_string())
            }
        }
    }
}

/// Map parser attributes onto record fields, converting units.
pub fn properties_from(log: ParsedLog) -> Properties {
    let scf_energies_au: Option<Vec<f64>> = log.scfenergies.map(|energies| {
        energies
            .as_slice()
            .iter()
            .map(|ev| ev / EV_PER_HARTREE)
            .collect()
    });
    let final_scf_energy_au = scf_energies_au
        .as_ref()
        .and_then(|energies| energies.last().copied());

    let dipole_moment_debye = log
        .moments
        .as_ref()
        .and_then(|moments| moments.get(1))
        .and_then(|dipole| match dipole.as_slice() {
            [x, y, z, ..] => Some(Dipole::from_components(*x, *y, *z)),
            _ => None,
        });

    let final_geometry = log.atomcoords.as_ref().and_then(|c| c.last_outer());
    let natoms = final_geometry
        .as_ref()
        .and_then(|frame| frame.shape().first().copied());

    Properties {
        metadata: log.metadata,
        charge: log.charge.map(f64::from),
        multiplicity: log.mult.map(i64::from),
        nbasis: log.nbasis,
        natoms,
        scf_energies_au,
        final_scf_energy_au,
        vibrations: Vibrations {
            frequencies: log.vibfreqs,
            ir_intensities: log.vibirs,
            force_constants: log.vibfconsts,
            reduced_masses: log.vibredmass,
        },
        dipole_moment_debye,
        mulliken_charges: log.mulliken.and_then(|mut frames| frames.pop()),
        zpe_au: log.zpve,
        atom_numbers: log.atomnos,
        final_geometry_angstrom: final_geometry,
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
