//! CLI argument definitions using clap
//!
//! Commands:
//! - formgate check --schema <path>
//! - formgate validate --schema <path> [--config <path>]
//! - formgate serve --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// formgate - validation and sanitization of dynamic form responses
#[derive(Parser, Debug)]
#[command(name = "formgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a form definition and report every integrity problem
    Check {
        /// Path to the form schema JSON file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Validate one response read from stdin against a form definition
    Validate {
        /// Path to the form schema JSON file
        #[arg(long)]
        schema: PathBuf,

        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load the schema directory and validate JSON-line requests from stdin
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./formgate.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
