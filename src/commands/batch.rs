//! Batch conversion handler

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use gaussparse::cli::{resolve_path, BatchArgs};
use gaussparse::files::discover;
use gaussparse::logging;
use gaussparse::notify::Notifier;
use gaussparse::output::{AggregateSink, OutputMode, SeparateSink};
use gaussparse::{Config, Dispatcher, Extractor, GaussianParser};

/// Discover logs, extract them in parallel and write the records.
///
/// Input errors are fatal. Per-file parse errors end up in the output.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: BatchArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    logging::init(&config.logging)?;

    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let input_dir = resolve_path(
        args.input_dir.as_deref().unwrap_or(&config.input.directory),
        &cwd,
    );
    let pattern = args.pattern.unwrap_or_else(|| config.input.pattern.clone());
    info!("Starting parsing process for directory: {}", input_dir.display());

    let files = discover(&input_dir, &pattern)?;
    if files.is_empty() {
        warn!("No files matched '{}' in {}", pattern, input_dir.display());
        println!("No files matched '{}' in {}", pattern, input_dir.display());
        return Ok(());
    }
    info!("Found {} files to process", files.len());

    let dispatcher = Dispatcher::new(Extractor::new(Arc::new(GaussianParser::new())))
        .with_jobs(args.jobs.or(config.dispatch.jobs));
    let explicit = args.output.map(|path| resolve_path(&path, &cwd));
    let mode = OutputMode::resolve(&config.output, &cwd, explicit, args.separate, args.sort);

    let count = match &mode {
        OutputMode::Aggregate { destination, sort } => {
            let mut sink = AggregateSink::new();
            dispatcher.run(&files, &mut sink)?;
            if *sort {
                sink.sort_by_file();
            }
            sink.write(destination)?
        }
        OutputMode::Separate { directory, suffix } => {
            let mut sink = SeparateSink::create(directory, suffix.as_str())?;
            dispatcher.run(&files, &mut sink)?
        }
    };
    println!("Wrote {} records to {}", count, mode.location().display());

    info!("Parsing completed successfully. Processed {} files.", files.len());
    Notifier::from_env(&config.notify)
        .send(format!(
            "Gaussian log parsing completed. Processed {} files in {}.",
            files.len(),
            input_dir.display()
        ))
        .wait();
    Ok(())
}
