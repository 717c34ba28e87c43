//! Observability for the apple statistics service
//!
//! Logging goes through `tracing`. Handlers and the store emit events;
//! this module only installs the subscriber.
//!
//! # Usage
//!
//! ```ignore
//! use apple_stats::observability::{init_logging, LogLevel};
//!
//! init_logging(&LogLevel::parse("detailed"));
//! ```

mod logging;

pub use logging::{init_logging, LogLevel};
