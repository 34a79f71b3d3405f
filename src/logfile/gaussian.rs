//! Gaussian output log parser.
//!
//! Reads the sections of a Gaussian `.log` that the record extractor needs in a
//! single pass over the lines:
//!
//! - program banner and route section (metadata)
//! - charge, multiplicity and basis size
//! - `Standard orientation` / `Input orientation` geometry tables
//! - `SCF Done` energies
//! - dipole moment, Mulliken charges
//! - harmonic frequency tables and zero-point correction
//! - job timings and termination status
//!
//! Files that never mention Gaussian are reported as unrecognised (`Ok(None)`)
//! rather than as errors.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDateTime;

use super::{LogParser, NdArray, ParseError, ParsedLog, EV_PER_HARTREE};
use crate::json::Value;

/// Markers that identify a Gaussian output file.
const SIGNATURES: &[&str] = &["Gaussian, Inc.", "Entering Gaussian System"];

/// Date layout of the `Normal termination ... at <date>` trailer.
const TERMINATION_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Parser for Gaussian 03/09/16 output logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianParser;

impl GaussianParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse log text already held in memory.
    pub fn parse_str(&self, content: &str) -> Result<Option<ParsedLog>, ParseError> {
        let lines: Vec<&str> = content.lines().collect();
        let mut collector = Collector::default();
        let mut i = 0;
        while i < lines.len() {
            i = collector.consume(&lines, i)?;
        }
        collector.finish()
    }
}

impl LogParser for GaussianParser {
    fn name(&self) -> &'static str {
        "Gaussian"
    }

    fn parse(&self, path: &Path) -> Result<Option<ParsedLog>, ParseError> {
        let bytes = fs::read(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        let parsed = self.parse_str(&content)?;
        Ok(parsed.map(|mut log| {
            log.metadata
                .insert("filename".to_string(), Value::from(path));
            log
        }))
    }
}

/// One geometry table.
struct Frame {
    atomnos: Vec<i64>,
    coords: Vec<[f64; 3]>,
}

#[derive(Default)]
struct Vibrations {
    freqs: Vec<f64>,
    irs: Vec<f64>,
    fconsts: Vec<f64>,
    redmass: Vec<f64>,
}

/// Accumulates attributes while scanning.
#[derive(Default)]
struct Collector {
    recognised: bool,
    metadata: BTreeMap<String, Value>,
    route: Option<String>,
    charge: Option<i32>,
    mult: Option<u32>,
    nbasis: Option<usize>,
    standard: Vec<Frame>,
    input: Vec<Frame>,
    scfenergies: Vec<f64>,
    dipole: Option<[f64; 3]>,
    mulliken: Vec<Vec<f64>>,
    vibrations: Option<Vibrations>,
    zpve: Option<f64>,
    cpu_time: Vec<Duration>,
    wall_time: Vec<Duration>,
    success: Option<bool>,
    completed_at: Option<NaiveDateTime>,
}

impl Collector {
    /// Handle the line at `i` and return the index of the next unread line.
    fn consume(&mut self, lines: &[&str], i: usize) -> Result<usize, ParseError> {
        let line = lines[i];
        let t = line.trim();

        if !self.recognised && SIGNATURES.iter().any(|s| line.contains(s)) {
            self.recognised = true;
        }

        if let Some(rest) = t.strip_prefix("Gaussian ") {
            self.banner(rest);
        } else if t.starts_with('#') && self.route.is_none() {
            return Ok(self.route_section(lines, i));
        } else if t.starts_with("Charge =") && t.contains("Multiplicity =") {
            if self.charge.is_none() {
                self.charge_and_multiplicity(t, i)?;
            }
        } else if t.contains("basis functions,") {
            let count = first_token(t, i)?;
            self.nbasis = Some(parse_number(count, i)?);
        } else if t == "Standard orientation:" || t == "Input orientation:" {
            // A table cut off by the end of the file ends the scan
            let Some((frame, next)) = orientation_table(lines, i)? else {
                return Ok(lines.len());
            };
            let frames = if t.starts_with("Standard") {
                &mut self.standard
            } else {
                &mut self.input
            };
            if let Some(first) = frames.first() {
                if first.atomnos.len() != frame.atomnos.len() {
                    return Err(malformed(
                        i,
                        format!(
                            "geometry has {} atoms, earlier frames have {}",
                            frame.atomnos.len(),
                            first.atomnos.len()
                        ),
                    ));
                }
            }
            frames.push(frame);
            return Ok(next);
        } else if let Some(rest) = t.strip_prefix("SCF Done:") {
            let (_, value) = rest
                .split_once('=')
                .ok_or_else(|| malformed(i, "SCF Done line without '='"))?;
            let hartree: f64 = parse_number(first_token(value, i)?, i)?;
            self.scfenergies.push(hartree * EV_PER_HARTREE);
        } else if t.starts_with("Dipole moment (field-independent basis, Debye)") {
            return self.dipole(lines, i);
        } else if is_mulliken_header(t) {
            return self.mulliken_block(lines, i);
        } else if t.starts_with("Harmonic frequencies") {
            self.vibrations = Some(Vibrations::default());
        } else if let Some(rest) = t.strip_prefix("Zero-point correction=") {
            self.zpve = Some(parse_number(first_token(rest, i)?, i)?);
        } else if let Some(rest) = t.strip_prefix("Job cpu time:") {
            self.cpu_time.push(parse_elapsed(rest, i)?);
        } else if let Some(rest) = t.strip_prefix("Elapsed time:") {
            self.wall_time.push(parse_elapsed(rest, i)?);
        } else if t.starts_with("Normal termination of Gaussian") {
            self.success = Some(true);
            self.completed_at = t.split_once(" at ").and_then(|(_, date)| parse_date(date));
        } else if t.starts_with("Error termination") {
            self.success = Some(false);
        } else if let Some((label, rest)) = t.split_once("--") {
            self.vibration_row(label.trim(), rest, i)?;
        }

        Ok(i + 1)
    }

    /// `Gaussian 16:  ES64L-G16RevC.01  3-Jul-2019`
    fn banner(&mut self, rest: &str) {
        if self.metadata.contains_key("package") {
            return;
        }
        let Some((version, tail)) = rest.split_once(':') else {
            return;
        };
        let version = version.trim();
        if version.is_empty() || !version.chars().all(|c| c.is_ascii_digit()) {
            return;
        }
        let build = tail.split_whitespace().next().unwrap_or_default();
        let (platform, build) = build.split_once('-').unwrap_or(("", build));
        let revision = build.split_once("Rev").map(|(_, rev)| rev);

        self.metadata.insert("package".into(), "Gaussian".into());
        self.metadata
            .insert("legacy_package_version".into(), version.into());
        let package_version = match revision {
            Some(rev) => format!("{}+{}", version, rev),
            None => version.to_string(),
        };
        self.metadata
            .insert("package_version".into(), package_version.into());
        if !platform.is_empty() {
            self.metadata.insert("platform".into(), platform.into());
        }
    }

    /// Route lines run from the `#` line up to the next dashed separator.
    fn route_section(&mut self, lines: &[&str], start: usize) -> usize {
        let mut route = String::new();
        let mut i = start;
        while i < lines.len() {
            let t = lines[i].trim();
            if t.starts_with("---") {
                break;
            }
            route.push_str(t);
            i += 1;
        }

        let mut tokens = route.split_whitespace().peekable();
        // `#`, `#p`, `#n`, `#t` carry only the print level
        if let Some(first) = tokens.peek() {
            if first.len() <= 2 {
                tokens.next();
            }
        }
        let keywords: BTreeSet<String> = tokens
            .map(|tok| tok.trim_start_matches('#').to_lowercase())
            .filter(|tok| !tok.is_empty())
            .collect();

        if let Some((method, basis)) = route
            .split_whitespace()
            .find_map(|tok| method_and_basis(tok.trim_start_matches('#')))
        {
            self.metadata
                .insert("methods".into(), Value::List(vec![method.into()]));
            self.metadata.insert("basis_set".into(), basis.into());
        }
        self.metadata.insert(
            "keywords".into(),
            Value::Set(keywords.into_iter().map(Value::from).collect()),
        );
        self.route = Some(route);
        i
    }

    /// `Charge =  0 Multiplicity = 1`
    fn charge_and_multiplicity(&mut self, t: &str, i: usize) -> Result<(), ParseError> {
        let (charge, mult) = t
            .trim_start_matches("Charge =")
            .split_once("Multiplicity =")
            .ok_or_else(|| malformed(i, "charge line without multiplicity"))?;
        self.charge = Some(parse_number(charge.trim(), i)?);
        self.mult = Some(parse_number(first_token(mult, i)?, i)?);
        Ok(())
    }

    /// The line after the header holds `X= .. Y= .. Z= .. Tot= ..`.
    fn dipole(&mut self, lines: &[&str], i: usize) -> Result<usize, ParseError> {
        let Some(values) = lines.get(i + 1) else {
            return Ok(i + 1);
        };
        let mut vector = [0.0; 3];
        for (slot, label) in vector.iter_mut().zip(["X=", "Y=", "Z="]) {
            let token = labelled_value(values, label)
                .ok_or_else(|| malformed(i + 1, format!("dipole line without {}", label)))?;
            *slot = parse_number(token, i + 1)?;
        }
        self.dipole = Some(vector);
        Ok(i + 2)
    }

    /// Header, one column-index line, then `index symbol charge [spin]` rows
    /// until the `Sum of Mulliken` trailer.
    fn mulliken_block(&mut self, lines: &[&str], start: usize) -> Result<usize, ParseError> {
        let mut charges = Vec::new();
        let mut i = start + 2;
        while i < lines.len() {
            let t = lines[i].trim();
            let tokens: Vec<&str> = t.split_whitespace().collect();
            if tokens.len() < 3 || tokens[0].parse::<usize>().is_err() {
                break;
            }
            charges.push(parse_number(tokens[2], i)?);
            i += 1;
        }
        if !charges.is_empty() {
            self.mulliken.push(charges);
        }
        Ok(i)
    }

    /// `Frequencies --`, `Red. masses --`, `Frc consts --`, `IR Inten --`.
    fn vibration_row(&mut self, label: &str, rest: &str, i: usize) -> Result<(), ParseError> {
        let Some(vib) = self.vibrations.as_mut() else {
            return Ok(());
        };
        // HPModes prints a high-precision copy as `Frequencies ---`
        if rest.starts_with('-') {
            return Ok(());
        }
        let target = match label {
            "Frequencies" => &mut vib.freqs,
            "Red. masses" => &mut vib.redmass,
            "Frc consts" => &mut vib.fconsts,
            "IR Inten" => &mut vib.irs,
            _ => return Ok(()),
        };
        for token in rest.split_whitespace() {
            target.push(parse_number(token, i)?);
        }
        Ok(())
    }

    fn finish(self) -> Result<Option<ParsedLog>, ParseError> {
        if !self.recognised {
            return Ok(None);
        }

        let mut metadata = self.metadata;
        if !self.cpu_time.is_empty() {
            metadata.insert("cpu_time".into(), Value::from(self.cpu_time));
        }
        if !self.wall_time.is_empty() {
            metadata.insert("wall_time".into(), Value::from(self.wall_time));
        }
        if let Some(success) = self.success {
            metadata.insert("success".into(), success.into());
        }
        if let Some(at) = self.completed_at {
            metadata.insert("completed_at".into(), at.into());
        }

        let frames = if self.standard.is_empty() {
            self.input
        } else {
            self.standard
        };
        let atomnos = frames
            .last()
            .map(|frame| NdArray::from_vec(frame.atomnos.clone()));
        let atomcoords = if frames.is_empty() {
            None
        } else {
            let stacked = frames
                .iter()
                .map(|frame| NdArray::from_rows(&frame.coords))
                .collect::<Result<Vec<_>, _>>()
                .and_then(|frames| NdArray::stack(&frames))
                .map_err(|e| malformed(0, e.to_string()))?;
            Some(stacked)
        };

        let (vibfreqs, vibirs, vibfconsts, vibredmass) = match self.vibrations {
            Some(vib) => (
                non_empty(vib.freqs),
                non_empty(vib.irs),
                non_empty(vib.fconsts),
                non_empty(vib.redmass),
            ),
            None => (None, None, None, None),
        };

        Ok(Some(ParsedLog {
            metadata,
            charge: self.charge,
            mult: self.mult,
            nbasis: self.nbasis,
            atomnos,
            atomcoords,
            scfenergies: non_empty(self.scfenergies),
            moments: self.dipole.map(|d| vec![vec![0.0; 3], d.to_vec()]),
            mulliken: (!self.mulliken.is_empty()).then_some(self.mulliken),
            vibfreqs,
            vibirs,
            vibfconsts,
            vibredmass,
            zpve: self.zpve,
        }))
    }
}

/// Parse a geometry table starting at its title line.
///
/// Layout: title, dashes, two header lines, dashes, rows, dashes. Returns
/// `None` when the file ends before the closing dashes or the table has no rows.
fn orientation_table(lines: &[&str], start: usize) -> Result<Option<(Frame, usize)>, ParseError> {
    let mut i = start + 1;
    let mut separators = 0;
    while i < lines.len() && separators < 2 {
        if lines[i].trim().starts_with("---") {
            separators += 1;
        }
        i += 1;
    }
    if separators < 2 {
        return Ok(None);
    }

    let mut frame = Frame {
        atomnos: Vec::new(),
        coords: Vec::new(),
    };
    let mut closed = false;
    while i < lines.len() {
        let t = lines[i].trim();
        if t.starts_with("---") || t.is_empty() {
            closed = true;
            i += 1;
            break;
        }
        let tokens: Vec<&str> = t.split_whitespace().collect();
        // Older versions omit the "Atomic Type" column
        if tokens.len() < 5 {
            return Err(malformed(i, "geometry row has too few columns"));
        }
        frame.atomnos.push(parse_number(tokens[1], i)?);
        let xyz = &tokens[tokens.len() - 3..];
        frame.coords.push([
            parse_number(xyz[0], i)?,
            parse_number(xyz[1], i)?,
            parse_number(xyz[2], i)?,
        ]);
        i += 1;
    }
    if !closed || frame.atomnos.is_empty() {
        return Ok(None);
    }
    Ok(Some((frame, i)))
}

fn is_mulliken_header(t: &str) -> bool {
    (t.starts_with("Mulliken charges") || t.starts_with("Mulliken atomic charges"))
        && !t.contains("hydrogens summed")
}

/// Split `B3LYP/6-31G(d)` into method and basis set.
fn method_and_basis(token: &str) -> Option<(&str, &str)> {
    let slash = token.find('/')?;
    if token[..slash].contains('=') || token[..slash].contains('(') {
        return None;
    }
    let (method, basis) = (&token[..slash], &token[slash + 1..]);
    (!method.is_empty() && !basis.is_empty()).then_some((method, basis))
}

/// Token following `label`, e.g. the number after `X=`.
fn labelled_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let pos = line.find(label)?;
    line[pos + label.len()..].split_whitespace().next()
}

/// `0 days  0 hours  1 minutes 23.5 seconds.`
fn parse_elapsed(text: &str, i: usize) -> Result<Duration, ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut seconds = 0.0;
    for pair in tokens.chunks(2) {
        let [value, unit] = pair else {
            return Err(malformed(i, "unpaired value in elapsed time"));
        };
        let value: f64 = parse_number(value, i)?;
        let scale = match unit.trim_end_matches('.') {
            "days" | "day" => 86_400.0,
            "hours" | "hour" => 3_600.0,
            "minutes" | "minute" => 60.0,
            "seconds" | "second" => 1.0,
            other => return Err(malformed(i, format!("unknown time unit '{}'", other))),
        };
        seconds += value * scale;
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| malformed(i, e.to_string()))
}

/// `Wed Jul 10 10:12:30 2024.`
fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let normalized = text
        .trim()
        .trim_end_matches('.')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    NaiveDateTime::parse_from_str(&normalized, TERMINATION_DATE_FORMAT).ok()
}

fn first_token(text: &str, i: usize) -> Result<&str, ParseError> {
    text.split_whitespace()
        .next()
        .ok_or_else(|| malformed(i, "expected a value"))
}

/// Parse a number, accepting Fortran `D` exponents.
fn parse_number<T: std::str::FromStr>(token: &str, i: usize) -> Result<T, ParseError> {
    let normalized = token.replace(['D', 'd'], "E");
    normalized
        .parse()
        .map_err(|_| malformed(i, format!("invalid number '{}'", token)))
}

fn non_empty(values: Vec<f64>) -> Option<NdArray<f64>> {
    (!values.is_empty()).then(|| NdArray::from_vec(values))
}

fn malformed(index: usize, message: impl Into<String>) -> ParseError {
    ParseError::Malformed {
        line: index + 1,
        message: message.into(),
    }
}
