//! CLI module for apple-stats
//!
//! Provides command-line interface for:
//! - serve: Load the mirror file and run the HTTP API (default)
//! - check: Revalidate the mirror file and report invalid records

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, run, run_command, serve, AppConfig};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
