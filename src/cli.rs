//! Command-line definitions shared by both binaries.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use clap::Parser;

/// Version string with git hash and build date when available.
pub fn version() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();
    VERSION.get_or_init(|| {
        let date = env!("GAUSSPARSE_BUILD_DATE");
        match option_env!("VERGEN_GIT_SHA") {
            Some(sha) if !sha.is_empty() && sha.chars().all(|c| c.is_ascii_hexdigit()) => {
                let short = sha.get(..7).unwrap_or(sha);
                format!("{} ({} {})", env!("CARGO_PKG_VERSION"), short, date)
            }
            _ => format!("{} ({})", env!("CARGO_PKG_VERSION"), date),
        }
    })
}

/// Parse a directory of Gaussian logs into JSON records.
#[derive(Parser, Debug)]
#[command(name = "gaussparse", version = version(), about, long_about = None)]
#[command(after_help = "\
Examples:
  gaussparse                         Parse out_molecules/*.log
  gaussparse runs/ -p '*.out'        Parse runs/*.out
  gaussparse runs/ -o all.json       Write the aggregate to all.json
  gaussparse runs/ --separate        One <stem>.cclib.json per log

Set DISCORD_URL to be notified when a run completes.")]
pub struct BatchArgs {
    /// Directory containing the logs [default: out_molecules]
    pub input_dir: Option<PathBuf>,

    /// Glob pattern matched inside the input directory [default: *.log]
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Aggregate output file [default: out_molecules_json/out_molecules.json]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write one JSON file per log into out_molecules_json/
    #[arg(long)]
    pub separate: bool,

    /// Sort the aggregate by file name instead of completion order
    #[arg(long)]
    pub sort: bool,

    /// Number of worker threads [default: available parallelism]
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Configuration file [default: <config dir>/gaussparse/config.toml]
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Parse one Gaussian log into a JSON record.
#[derive(Parser, Debug)]
#[command(name = "gaussparse-file", version = version(), about, long_about = None)]
pub struct FileArgs {
    /// Gaussian log file
    pub logfile: PathBuf,

    /// Output path [default: <logfile> with its extension replaced by .cclib.json]
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Configuration file [default: <config dir>/gaussparse/config.toml]
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Expand a leading `~` and make the path absolute against `cwd`.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    }
}
