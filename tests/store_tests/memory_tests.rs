//! Tests for MemoryStore and catalog semantics
//!
//! These tests verify:
//! - Database/table lifecycle rules
//! - Insert validation (table required, length limit)
//! - Atomicity under concurrent callers

use std::sync::Arc;
use std::thread;

use linecmd::store::{Catalog, MemoryStore, Operation, MAX_TEXT_LEN};
use linecmd::{BackingService, LineCmdError};

// =============================================================================
// Helper Functions
// =============================================================================

fn store_with_table() -> MemoryStore {
    let store = MemoryStore::new();
    store.create_database().unwrap();
    store.create_table().unwrap();
    store
}

// =============================================================================
// Database Lifecycle Tests
// =============================================================================

#[test]
fn test_create_and_drop_database() {
    let store = MemoryStore::new();
    assert!(!store.has_database());

    store.create_database().unwrap();
    assert!(store.has_database());

    store.drop_database().unwrap();
    assert!(!store.has_database());
}

#[test]
fn test_create_database_twice_fails() {
    let store = MemoryStore::new();
    store.create_database().unwrap();

    let err = store.create_database().unwrap_err();
    assert!(matches!(err, LineCmdError::DatabaseExists(_)));
    assert_eq!(err.to_string(), "database 'test' already exists");
}

#[test]
fn test_drop_missing_database_fails() {
    let store = MemoryStore::new();
    assert!(matches!(store.drop_database(), Err(LineCmdError::DatabaseNotFound(_))));
}

#[test]
fn test_drop_database_drops_table() {
    let store = store_with_table();
    store.insert_record("hello").unwrap();

    store.drop_database().unwrap();
    store.create_database().unwrap();

    assert!(!store.has_table());
    assert!(store.records().is_empty());
}

// =============================================================================
// Table Lifecycle Tests
// =============================================================================

#[test]
fn test_create_table_requires_database() {
    let store = MemoryStore::new();
    assert!(matches!(store.create_table(), Err(LineCmdError::DatabaseNotFound(_))));
}

#[test]
fn test_create_table_is_idempotent() {
    let store = store_with_table();
    store.insert_record("kept").unwrap();

    store.create_table().unwrap();
    assert_eq!(store.records().len(), 1);
}

#[test]
fn test_drop_missing_table_fails() {
    let store = MemoryStore::new();
    store.create_database().unwrap();

    let err = store.drop_table().unwrap_err();
    assert_eq!(err.to_string(), "unknown table 'test.messages'");
}

// =============================================================================
// Insert Tests
// =============================================================================

#[test]
fn test_insert_assigns_sequential_ids() {
    let store = store_with_table();
    store.insert_record("one").unwrap();
    store.insert_record("two").unwrap();

    let records = store.records();
    assert_eq!(records.len(), 2);
    assert_eq!((records[0].id, records[0].text.as_str()), (1, "one"));
    assert_eq!((records[1].id, records[1].text.as_str()), (2, "two"));
    assert!(records[0].created > 0);
}

#[test]
fn test_insert_requires_table() {
    let store = MemoryStore::new();
    store.create_database().unwrap();
    assert!(matches!(store.insert_record("x"), Err(LineCmdError::TableNotFound(_))));
}

#[test]
fn test_insert_length_limit_counts_characters() {
    let store = store_with_table();

    store.insert_record(&"é".repeat(MAX_TEXT_LEN)).unwrap();

    let err = store.insert_record(&"a".repeat(MAX_TEXT_LEN + 1)).unwrap_err();
    assert!(matches!(err, LineCmdError::RecordTooLong { len: 257, max: 256 }));
    assert_eq!(store.records().len(), 1);
}

// =============================================================================
// Catalog Tests
// =============================================================================

#[test]
fn test_failed_apply_leaves_catalog_unchanged() {
    let mut catalog = Catalog::new();
    assert!(catalog.apply(Operation::insert("x")).is_err());
    assert!(!catalog.has_database());

    catalog.apply(Operation::CreateDatabase { owner: "alice".to_string() }).unwrap();
    assert_eq!(catalog.owner(), Some("alice"));
    assert!(catalog.apply(Operation::DropTable).is_err());
    assert!(catalog.has_database());
}

#[test]
fn test_validate_does_not_mutate() {
    let catalog = Catalog::new();
    catalog
        .validate(&Operation::CreateDatabase { owner: "bob".to_string() })
        .unwrap();
    assert!(!catalog.has_database());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_inserts_are_all_applied() {
    let store = Arc::new(store_with_table());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..50 {
                    store.insert_record(&format!("t{}-{}", t, i)).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let records = store.records();
    assert_eq!(records.len(), 400);
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=400).collect::<Vec<u64>>());
}

#[test]
fn test_concurrent_create_database_only_one_wins() {
    let store = Arc::new(MemoryStore::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.create_database().is_ok())
        })
        .collect();
    let wins = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();

    assert_eq!(wins, 1);
}
