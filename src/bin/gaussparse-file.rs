//! gaussparse-file - convert a single Gaussian log to JSON

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use gaussparse::cli::FileArgs;
use gaussparse::files::sibling_output_path;
use gaussparse::logging;
use gaussparse::output::write_json;
use gaussparse::{Config, Extractor, GaussianParser};

/// Unlike the batch tool, a file the parser cannot read is a hard failure.
#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    let args = FileArgs::parse();
    let config = Config::load(args.config.as_deref())?;
    logging::init(&config.logging)?;

    let extractor = Extractor::new(Arc::new(GaussianParser::new()));
    let record = extractor
        .try_record(&args.logfile)
        .with_context(|| format!("Failed to parse {}", args.logfile.display()))?;

    let out = match args.out {
        Some(path) => path,
        None => sibling_output_path(&args.logfile, &config.output.separate_suffix)?,
    };
    write_json(&out, &record)?;
    println!("Saved: {}", out.display());
    Ok(())
}
