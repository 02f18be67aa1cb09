//! CLI module for the relay server
//!
//! Provides command-line interface parsing for the relay-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Relay - route requests to remote A2A agents and stream their answers
#[derive(Parser, Debug)]
#[command(
    name = "relay-server",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "Relay - multi-agent streaming gateway",
    long_about = "Routes each request to the most suitable remote agent (selected by an LLM)\n\
                  and relays the agent's answer back as a server-sent-events stream.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  relay-server                       # Start the server (requires relay.toml)\n    \
                  relay-server --config my.toml      # Use a custom config file\n    \
                  relay-server agents                # Probe configured agents\n    \
                  relay-server config --validate     # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "relay.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover the configured agents and show which ones respond
    Agents,

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
