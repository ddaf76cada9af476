//! Command-line interface for tunekeeper.
//!
//! This module provides CLI commands for adding, listing, inspecting,
//! editing and removing library items.

mod commands;

pub use commands::{Cli, Commands, KindArgs, run_command};
