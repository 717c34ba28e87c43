//! CSV persistence for apple records
//!
//! The mirror file holds the canonical persistent state of the store in
//! the fixed 21-column flat layout. The codec is also the import format
//! for uploads.
//!
//! # Design Principles
//!
//! - Whole-file rewrite on every flush (no append, no versioning)
//! - Atomic replace via temp file + fsync + rename
//! - Missing file means empty store
//! - Numbers re-parsed on load; the store never holds text quantities

pub mod codec;
mod errors;
mod mirror;

pub use codec::{decode, encode, CsvTable, FlatRow};
pub use errors::{StorageError, StorageErrorCode, StorageResult};
pub use mirror::{MirrorFile, DEFAULT_MIRROR_PATH};
