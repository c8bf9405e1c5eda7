//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the kavex binary.

mod commands;
mod migrate;
mod serve;

pub use commands::{Cli, Commands};
pub use migrate::run_migrate;
pub use serve::run_serve;
