//! # Askja CLI
//!
//! This is the binary entry point for the `askja` command-line tool.
//!
//! It parses command-line arguments with `clap`, sets up logging and runs
//! the selected command. The publish logic lives in the `askja` library
//! crate; the binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
