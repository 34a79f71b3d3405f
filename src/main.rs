//! gaussparse - batch conversion of Gaussian logs to JSON

use anyhow::Result;
use clap::Parser;

use gaussparse::cli::BatchArgs;

mod commands;

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    let args = BatchArgs::parse();
    commands::batch::handle(args)
}
