//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kavex - Discord/Minecraft chat bridge
#[derive(Parser, Debug)]
#[command(name = "kavex")]
#[command(about = "Bridge Discord channels and Minecraft servers over websockets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "KAVEX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the websocket gateway and the Discord bot
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Print the peppered hash of a link token
    HashToken {
        /// Token as configured on the Minecraft server
        token: String,
    },
}
