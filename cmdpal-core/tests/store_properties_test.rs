//! Integration tests for the command store contracts

mod common;

use cmdpal_core::store::DATABASE_FILE;
use cmdpal_core::{CommandStore, NewCustomEntry, StoreError};
use common::{catalog_ids, init_test_logging, make_batch, make_entry, open_store};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_repeated_initialize_keeps_version() {
    init_test_logging();
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;
    store
        .catalog()
        .bulk_replace(&[make_entry("ls", 4)])
        .await
        .unwrap();

    for _ in 0..5 {
        store.initialize().await.unwrap();
        assert_eq!(store.local_version(), 4);
    }
    assert_eq!(catalog_ids(&store).await, vec!["ls"]);
}

#[tokio::test]
async fn test_concurrent_initialize() {
    let temp_dir = TempDir::new().unwrap();
    let store = CommandStore::new(temp_dir.path().join(DATABASE_FILE));

    let (a, b, c) = tokio::join!(store.initialize(), store.initialize(), store.initialize());
    a.unwrap();
    b.unwrap();
    c.unwrap();
    assert!(store.is_initialized());
}

#[tokio::test]
async fn test_version_is_monotonic_across_batches() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let mut last = store.local_version();
    for version in [1, 2, 2, 5, 8] {
        store
            .catalog()
            .bulk_replace(&make_batch(&format!("v{version}"), 3, version))
            .await
            .unwrap();
        let current = store.local_version();
        assert!(current >= last, "{current} < {last}");
        assert_eq!(current, version);
        last = current;
    }
}

#[tokio::test]
async fn test_failed_batch_leaves_pre_call_state() {
    init_test_logging();
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    store
        .catalog()
        .bulk_replace(&make_batch("old", 3, 2))
        .await
        .unwrap();
    let before_ids = catalog_ids(&store).await;
    let mut before_rows = store.catalog().get_all().await.unwrap();

    // Entry 5 of 10 has an empty id, which the table rejects
    let mut batch = make_batch("new", 10, 3);
    batch[4].id = String::new();
    // Also overwrite an existing row, which must roll back too
    batch[0].id = "old-0".to_string();

    let err = store.catalog().bulk_replace(&batch).await.unwrap_err();
    assert!(matches!(err, StoreError::StorageWrite { .. }), "{err:?}");

    assert_eq!(catalog_ids(&store).await, before_ids);
    let mut after_rows = store.catalog().get_all().await.unwrap();
    after_rows.sort_by(|a, b| a.id.cmp(&b.id));
    before_rows.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(after_rows, before_rows);
    assert_eq!(store.local_version(), 2);
}

#[tokio::test]
async fn test_cancelled_batch_rolls_back() {
    init_test_logging();
    let temp_dir = TempDir::new().unwrap();
    {
        let store = open_store(&temp_dir).await;
        store
            .catalog()
            .bulk_replace(&make_batch("seed", 2, 1))
            .await
            .unwrap();

        // Large enough that the timeout fires while the transaction is open
        let batch = make_batch("big", 20_000, 2);
        let result = tokio::time::timeout(
            Duration::from_millis(30),
            store.catalog().bulk_replace(&batch),
        )
        .await;
        assert!(result.is_err(), "batch finished before the timeout");

        assert_eq!(catalog_ids(&store).await, vec!["seed-0", "seed-1"]);
        assert_eq!(store.local_version(), 1);
        store.close().await;
    }

    let store = open_store(&temp_dir).await;
    assert_eq!(catalog_ids(&store).await, vec!["seed-0", "seed-1"]);
    assert_eq!(store.local_version(), 1);
}

#[tokio::test]
async fn test_round_trip_fidelity() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let mut entry = make_entry("tar", 3);
    entry.tags = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    assert_eq!(entry.variations.len(), 2);

    store
        .catalog()
        .bulk_replace(&[entry.clone()])
        .await
        .unwrap();

    let all = store.catalog().get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].tags, vec!["a", "b", "c"]);
    assert_eq!(all[0].variations, entry.variations);
    assert_eq!(all[0], entry);
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let custom_id;
    {
        let store = open_store(&temp_dir).await;
        store
            .catalog()
            .bulk_replace(&make_batch("cmd", 4, 6))
            .await
            .unwrap();
        custom_id = store
            .custom()
            .add(NewCustomEntry::new("Mine", "echo mine"))
            .await
            .unwrap()
            .id;
        store.close().await;
    }

    let store = open_store(&temp_dir).await;
    assert_eq!(store.local_version(), 6);
    assert_eq!(catalog_ids(&store).await.len(), 4);

    let custom = store.custom().get_all().await.unwrap();
    assert_eq!(custom.len(), 1);
    assert_eq!(custom[0].id, custom_id);
}

#[tokio::test]
async fn test_custom_entries_do_not_touch_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;
    store
        .catalog()
        .bulk_replace(&make_batch("cat", 3, 5))
        .await
        .unwrap();

    let catalog_before = catalog_ids(&store).await;

    let added = store
        .custom()
        .add(NewCustomEntry::new("Reload nginx", "sudo systemctl reload nginx"))
        .await
        .unwrap();
    assert_eq!(store.local_version(), 5);
    assert_eq!(catalog_ids(&store).await, catalog_before);

    store.custom().delete(&added.id).await.unwrap();
    assert_eq!(store.local_version(), 5);
    assert_eq!(catalog_ids(&store).await, catalog_before);
}

#[tokio::test]
async fn test_custom_id_outside_namespace_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;
    store
        .catalog()
        .bulk_replace(&[make_entry("ls", 1)])
        .await
        .unwrap();

    let mut entry = NewCustomEntry::new("My ls", "ls -lah");
    entry.id = "ls".to_string();
    let err = store.custom().add(entry).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidEntry { .. }), "{err:?}");

    assert!(store.custom().get_all().await.unwrap().is_empty());
    assert_eq!(catalog_ids(&store).await, vec!["ls"]);

    let mut entry = NewCustomEntry::new("My ls", "ls -lah");
    entry.id = "custom-ls".to_string();
    store.custom().add(entry).await.unwrap();
    assert_eq!(store.custom().get_all().await.unwrap()[0].id, "custom-ls");
}

#[tokio::test]
async fn test_delete_missing_id_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let kept = store
        .custom()
        .add(NewCustomEntry::new("Keep", "echo keep"))
        .await
        .unwrap();

    let removed = store.custom().delete("custom-does-not-exist").await.unwrap();
    assert!(!removed);
    assert_eq!(store.custom().get_all().await.unwrap(), vec![kept]);
}

#[tokio::test]
async fn test_concurrent_writers_are_serialized() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let catalog = store.catalog();
    let custom = store.custom();
    let first = make_batch("a", 20, 2);
    let second = make_batch("b", 20, 3);
    let (a, b, c) = tokio::join!(
        catalog.bulk_replace(&first),
        catalog.bulk_replace(&second),
        custom.add(NewCustomEntry::new("x", "echo x")),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(catalog_ids(&store).await.len(), 40);
    assert_eq!(store.local_version(), 3);
}
