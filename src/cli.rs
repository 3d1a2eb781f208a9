//! Command-line interface for strictly_sim.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Sim - tic-tac-toe simulation sessions
#[derive(Parser, Debug)]
#[command(name = "strictly_sim")]
#[command(about = "Simulate tic-tac-toe games with pluggable strategies", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API (game engine and sessions)
    Serve {
        /// Path to the TOML config file
        #[arg(short, long, default_value = "strictly_sim.toml")]
        config: PathBuf,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Remote game engine URL (overrides config)
        #[arg(long)]
        engine_url: Option<String>,
    },

    /// Run only the game engine API
    Engine {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3001")]
        port: u16,
    },

    /// Simulate games from the command line and print the results
    Simulate {
        /// Strategy id (random, rule_based, ai)
        #[arg(short, long, default_value = "random")]
        strategy: String,

        /// Remote game engine URL. Plays in-process if omitted.
        #[arg(long)]
        engine_url: Option<String>,

        /// Number of games to play
        #[arg(short, long, default_value = "1")]
        games: u32,

        /// Path to the TOML config file
        #[arg(short, long, default_value = "strictly_sim.toml")]
        config: PathBuf,
    },

    /// List available strategies
    Strategies,
}
