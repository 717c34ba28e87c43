//! CLI argument definitions using clap
//!
//! Commands:
//! - apple-stats serve [--config <path>] [--host ..] [--port ..] [--data-file ..]
//! - apple-stats check [--config <path>] [--data-file <path>]
//!
//! With no subcommand the server starts with defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EU apple market statistics service
#[derive(Parser, Debug)]
#[command(name = "apple-stats")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log verbosity: none, generic or detailed
    #[arg(long, global = true, default_value = "generic")]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Path to JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// CSV mirror file
        #[arg(long)]
        data_file: Option<PathBuf>,

        /// Admit uploaded rows without running the validator
        #[arg(long)]
        trusted_import: bool,
    },

    /// Revalidate every record in the mirror file and report
    Check {
        /// Path to JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV mirror file
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Serve {
            config: None,
            host: None,
            port: None,
            data_file: None,
            trusted_import: false,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
