//! CLI module for formgate
//!
//! Provides command-line interface for:
//! - check: integrity report for a form definition
//! - validate: one-shot response validation
//! - serve: JSON-line validation loop over a schema directory

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, check_schema, run, run_command, serve, serve_requests, validate};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
