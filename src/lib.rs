//! apple-stats - EU apple market statistics service
//!
//! Annual apple balance records keyed by marketing year, held in memory,
//! mirrored to a CSV file and served over an HTTP JSON API.
//!
//! - `schema`: record types and the validator
//! - `storage`: CSV codec and the atomic mirror file
//! - `store`: the in-memory record store
//! - `http_server`: axum routes, errors and server
//! - `observability`: tracing setup
//! - `cli`: argument parsing and commands

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod schema;
pub mod storage;
pub mod store;
