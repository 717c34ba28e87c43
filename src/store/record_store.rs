//! Record store
//!
//! The store owns the marketing-year index and the mirror file. Every
//! mutation runs under the write lock as one sequence:
//!
//! 1. Clone the current mapping into a candidate
//! 2. Apply the mutation to the candidate
//! 3. Flush the candidate to the mirror
//! 4. Swap the candidate in
//!
//! A failed flush therefore leaves memory exactly as it was, and readers
//! never observe a mapping that is not also on disk.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{error, info};

use crate::schema::AppleRecord;
use crate::storage::MirrorFile;

use super::errors::{StoreError, StoreResult};

type Index = BTreeMap<String, AppleRecord>;

/// Marketing-year keyed record store with a CSV mirror
#[derive(Debug)]
pub struct RecordStore {
    records: RwLock<Index>,
    mirror: MirrorFile,
}

impl RecordStore {
    /// Opens the store, loading the mirror if it exists.
    ///
    /// # Errors
    ///
    /// Fails if the mirror exists but cannot be read or decoded. A missing
    /// mirror yields an empty store.
    pub fn open(mirror: MirrorFile) -> StoreResult<Self> {
        let loaded = mirror.load()?;
        let mut records = Index::new();
        for record in loaded {
            // Later rows win, as they would for an upload.
            records.insert(record.marketing_year.clone(), record);
        }

        info!(
            path = %mirror.path().display(),
            records = records.len(),
            "record store opened"
        );

        Ok(Self {
            records: RwLock::new(records),
            mirror,
        })
    }

    /// Path of the backing mirror file
    pub fn mirror_path(&self) -> &Path {
        self.mirror.path()
    }

    /// Looks up one marketing year
    pub fn get(&self, marketing_year: &str) -> Option<AppleRecord> {
        self.read().get(marketing_year).cloned()
    }

    /// All records, sorted by marketing year
    pub fn list(&self) -> Vec<AppleRecord> {
        self.read().values().cloned().collect()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Inserts or replaces a record, then flushes.
    pub fn put(&self, record: AppleRecord) -> StoreResult<()> {
        self.commit("put", |index| {
            index.insert(record.marketing_year.clone(), record);
            Ok(())
        })
    }

    /// Replaces a record that already exists, then flushes.
    ///
    /// The existence check and the write happen under one lock, so two
    /// concurrent replacements cannot interleave.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the marketing year is not stored.
    pub fn replace_existing(&self, record: AppleRecord) -> StoreResult<AppleRecord> {
        self.commit("replace", |index| {
            let slot = index
                .get_mut(&record.marketing_year)
                .ok_or_else(|| StoreError::NotFound(record.marketing_year.clone()))?;
            *slot = record.clone();
            Ok(record)
        })
    }

    /// Inserts or replaces a batch, then flushes once.
    ///
    /// All records land or none do. Duplicate years within the batch
    /// resolve to the last occurrence. Returns the batch size.
    pub fn put_all(&self, records: Vec<AppleRecord>) -> StoreResult<usize> {
        let count = records.len();
        self.commit("put_all", |index| {
            for record in records {
                index.insert(record.marketing_year.clone(), record);
            }
            Ok(count)
        })
    }

    /// Rewrites the mirror from the current mapping.
    pub fn flush(&self) -> StoreResult<()> {
        let guard = self.write();
        self.mirror.write(guard.values())?;
        Ok(())
    }

    fn commit<T, F>(&self, operation: &'static str, mutate: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Index) -> StoreResult<T>,
    {
        let mut guard = self.write();

        let mut candidate = guard.clone();
        let outcome = mutate(&mut candidate)?;

        if let Err(e) = self.mirror.write(candidate.values()) {
            error!(operation, error = %e, "mirror flush failed, mutation discarded");
            return Err(e.into());
        }

        *guard = candidate;
        info!(operation, records = guard.len(), "store committed");

        Ok(outcome)
    }

    // The mapping is only ever swapped whole, so a poisoned lock still
    // guards a consistent value.
    fn read(&self) -> RwLockReadGuard<'_, Index> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Index> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}
