//! apple-stats CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`, printing any error
//! code and message to stderr and exiting non-zero on failure.

use apple_stats::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("error[{}]: {}", e.code_str(), e.message());
        std::process::exit(1);
    }
}
