//! Persistent record store
//!
//! A single long-lived mapping from marketing year to record with two
//! external effects: read-through load of the mirror at startup and
//! write-through flush after every mutation.

mod errors;
mod record_store;

pub use errors::{StoreError, StoreResult};
pub use record_store::RecordStore;
