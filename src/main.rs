//! tunekeeper - A music library manager.
//!
//! Keeps a catalogue of albums, tracks and extra files in a SQLite
//! database. Items are selected with a small query language
//! (`artist:wu% 'year::199\d'`), and albums added twice are merged instead
//! of duplicated.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod matcher;
pub mod metadata;
pub mod model;
pub mod query;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log targets enabled by default.
const LOG_TARGETS: &[&str] = &["tunekeeper", "query", "db", "library"];

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; subsystem logs use their own targets
    let level = if args.verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    for target in LOG_TARGETS {
        filter = filter.add_directive(format!("{target}={level}").parse()?);
    }
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run_command(&args)
}
