//! Store Persistence Tests
//!
//! - Every mutation is on disk before it is visible
//! - Reopening the mirror restores the same mapping
//! - A failed flush leaves memory unchanged
//! - Batches apply whole or not at all

use std::fs;
use std::sync::Arc;
use std::thread;

use apple_stats::schema::{validate, AppleRecord, FreshStats, ProcessedStats};
use apple_stats::storage::{MirrorFile, StorageErrorCode};
use apple_stats::store::{RecordStore, StoreError};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn record(year: &str, area: f64) -> AppleRecord {
    AppleRecord {
        marketing_year: year.into(),
        area,
        r#yield: 25.0,
        total_production: 100.0,
        losses_and_feed: 5.0,
        usable_production: 95.0,
        fresh: FreshStats {
            production: 40.0,
            exports: 10.0,
            imports: 8.0,
            consumption: 35.0,
            per_capita_production: 9.1,
            ending_stocks: 12.0,
            stock_change: -3.0,
            self_sufficiency_rate: 1.05,
        },
        processed: ProcessedStats {
            production: 50.0,
            exports: 4.0,
            imports: 2.0,
            consumption: 47.0,
            per_capita_production: 11.2,
            self_sufficiency_rate: 0.98,
        },
        per_capita_production: 20.3,
    }
}

fn mirror_path(tmp: &TempDir) -> std::path::PathBuf {
    tmp.path().join("data").join("apple_stats.csv")
}

fn open(tmp: &TempDir) -> RecordStore {
    RecordStore::open(MirrorFile::new(mirror_path(tmp))).unwrap()
}

// =============================================================================
// Durability Tests
// =============================================================================

/// Records survive a restart with identical values.
#[test]
fn test_records_survive_reopen() {
    let tmp = TempDir::new().unwrap();

    {
        let store = open(&tmp);
        store
            .put_all(vec![record("2016/17", 480.0), record("2017/18", 470.5)])
            .unwrap();
        store.put(record("2018/19", 465.25)).unwrap();
    }

    let store = open(&tmp);
    assert_eq!(store.len(), 3);
    assert_eq!(store.get("2017/18").unwrap(), record("2017/18", 470.5));
    assert_eq!(store.get("2018/19").unwrap().fresh.stock_change, -3.0);
}

/// A padded year is keyed the same before and after a restart.
#[test]
fn test_padded_year_key_stable_across_reopen() {
    let tmp = TempDir::new().unwrap();
    let mut doc = serde_json::to_value(record("2020/21", 480.0)).unwrap();
    doc["marketing_year"] = json!("2020/21 ");

    let keys_before: Vec<_> = {
        let store = open(&tmp);
        store.put_all(vec![validate(&doc).unwrap()]).unwrap();
        store.list().into_iter().map(|r| r.marketing_year).collect()
    };

    let store = open(&tmp);
    let keys_after: Vec<_> = store.list().into_iter().map(|r| r.marketing_year).collect();
    assert_eq!(keys_before, vec!["2020/21"]);
    assert_eq!(keys_after, keys_before);
    assert_eq!(store.get("2020/21").unwrap().area, 480.0);
}

/// Mirror directory is created on first write.
#[test]
fn test_first_write_creates_mirror() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);
    assert!(store.is_empty());
    assert!(!mirror_path(&tmp).exists());

    store.put(record("2016/17", 480.0)).unwrap();

    assert!(mirror_path(&tmp).exists());
    assert_eq!(store.mirror_path(), mirror_path(&tmp));
}

/// Explicit flush of an empty store writes a header-only mirror.
#[test]
fn test_flush_empty_store_writes_header() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);
    store.flush().unwrap();

    let text = fs::read_to_string(mirror_path(&tmp)).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("marketing_year,"));

    assert!(open(&tmp).is_empty());
}

/// Listing is ordered by marketing year regardless of insert order.
#[test]
fn test_list_sorted_by_key() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);
    store.put(record("2019/20", 1.0)).unwrap();
    store.put(record("2016/17", 2.0)).unwrap();
    store.put(record("2018/19", 3.0)).unwrap();

    let years: Vec<_> = store.list().into_iter().map(|r| r.marketing_year).collect();
    assert_eq!(years, vec!["2016/17", "2018/19", "2019/20"]);
}

// =============================================================================
// Replace Tests
// =============================================================================

/// Upload semantics: existing keys are replaced, new keys added.
#[test]
fn test_put_all_replaces_by_key() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);
    store
        .put_all(vec![record("2016/17", 480.0), record("2017/18", 470.0)])
        .unwrap();

    store
        .put_all(vec![record("2017/18", 999.0), record("2018/19", 460.0)])
        .unwrap();

    assert_eq!(store.len(), 3);
    assert_eq!(store.get("2017/18").unwrap().area, 999.0);
    assert_eq!(open(&tmp).get("2017/18").unwrap().area, 999.0);
}

/// Duplicate years inside a batch resolve to the last occurrence.
#[test]
fn test_duplicate_years_last_wins() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);
    store
        .put_all(vec![record("2016/17", 1.0), record("2016/17", 2.0)])
        .unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("2016/17").unwrap().area, 2.0);
}

#[test]
fn test_replace_existing_requires_key() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);

    let err = store.replace_existing(record("1899", 1.0)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(ref year) if year == "1899"));
    assert!(store.is_empty());
    assert!(!mirror_path(&tmp).exists());
}

/// Repeating the same replacement leaves the same state.
#[test]
fn test_replace_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);
    store.put(record("2016/17", 480.0)).unwrap();

    store.replace_existing(record("2016/17", 500.0)).unwrap();
    let first = fs::read_to_string(mirror_path(&tmp)).unwrap();
    store.replace_existing(record("2016/17", 500.0)).unwrap();
    let second = fs::read_to_string(mirror_path(&tmp)).unwrap();

    assert_eq!(first, second);
    assert_eq!(store.list(), vec![record("2016/17", 500.0)]);
}

// =============================================================================
// Failure Tests
// =============================================================================

/// A flush that cannot write leaves both memory and disk untouched.
#[test]
fn test_failed_flush_discards_batch() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("apple_stats.csv");
    let store = RecordStore::open(MirrorFile::new(&path)).unwrap();
    store.put(record("2016/17", 480.0)).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    // A directory where the temp file should go makes the write fail.
    fs::create_dir(tmp.path().join("apple_stats.csv.tmp")).unwrap();

    let err = store
        .put_all(vec![record("2016/17", 1.0), record("2017/18", 2.0)])
        .unwrap_err();
    match err {
        StoreError::Storage(e) => assert_eq!(e.code(), StorageErrorCode::WriteFailed),
        other => panic!("unexpected error: {:?}", other),
    }

    assert_eq!(store.list(), vec![record("2016/17", 480.0)]);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

/// A corrupt mirror refuses to open instead of starting empty.
#[test]
fn test_malformed_mirror_fails_open() {
    let tmp = TempDir::new().unwrap();
    let path = mirror_path(&tmp);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "marketing_year,area\n2016/17,480\n").unwrap();

    let err = RecordStore::open(MirrorFile::new(&path)).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

/// Concurrent writers never lose a committed record.
#[test]
fn test_concurrent_puts_all_land() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(open(&tmp));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store
                    .put(record(&format!("20{:02}/{:02}", 10 + i, 11 + i), i as f64))
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 8);
    assert_eq!(open(&tmp).len(), 8);
}
