//! Logging configuration and initialization
//!
//! The `--log` flag selects one of three levels:
//!
//! | flag       | filter |
//! |------------|--------|
//! | `none`     | off    |
//! | `generic`  | info   |
//! | `detailed` | debug, with targets and line numbers |
//!
//! Anything else falls back to `warn`. `RUST_LOG`, when set, wins.

use std::fmt;

use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Log level selected on the command line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    None,
    #[default]
    Generic,
    Detailed,
    /// Unknown flag value, kept for the fallback warning
    Unrecognized(String),
}

impl LogLevel {
    /// Parses a flag value; never fails.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => LogLevel::None,
            "generic" => LogLevel::Generic,
            "detailed" => LogLevel::Detailed,
            _ => LogLevel::Unrecognized(value.to_string()),
        }
    }

    /// `EnvFilter` directive for this level
    pub fn filter_directive(&self) -> &'static str {
        match self {
            LogLevel::None => "off",
            LogLevel::Generic => "info",
            LogLevel::Detailed => "debug",
            LogLevel::Unrecognized(_) => "warn",
        }
    }

    fn is_detailed(&self) -> bool {
        matches!(self, LogLevel::Detailed)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::None => write!(f, "none"),
            LogLevel::Generic => write!(f, "generic"),
            LogLevel::Detailed => write!(f, "detailed"),
            LogLevel::Unrecognized(value) => write!(f, "{}", value),
        }
    }
}

/// Initialize tracing for the process.
///
/// Safe to call more than once; later calls leave the first subscriber
/// in place.
pub fn init_logging(level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(level.is_detailed())
        .with_line_number(level.is_detailed())
        .try_init();

    if let LogLevel::Unrecognized(value) = level {
        warn!(
            value = %value,
            "unrecognized log level, expected none|generic|detailed; using warn"
        );
    }
}
