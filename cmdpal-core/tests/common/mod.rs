//! Shared helpers for cmdpal-core integration tests

#![allow(dead_code)]

use cmdpal_core::store::DATABASE_FILE;
use cmdpal_core::{CatalogEntry, CommandLibrary, CommandStore, HttpRemote, Variation};
use std::sync::Once;
use std::time::Duration;
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize logging for tests (only once per test run)
pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn make_entry(id: &str, version: u32) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        name: format!("{id} command"),
        platform: "Linux".to_string(),
        category: "General".to_string(),
        tags: vec!["shell".to_string()],
        variations: vec![
            Variation::new(id, "Basic usage").primary(),
            Variation::new(format!("{id} --help"), "Show help"),
        ],
        version,
    }
}

/// `count` entries named `<prefix>-0..count`, all at `version`
pub fn make_batch(prefix: &str, count: usize, version: u32) -> Vec<CatalogEntry> {
    (0..count)
        .map(|i| make_entry(&format!("{prefix}-{i}"), version))
        .collect()
}

pub async fn open_store(temp_dir: &TempDir) -> CommandStore {
    CommandStore::open(temp_dir.path().join(DATABASE_FILE))
        .await
        .expect("store should open")
}

/// Library whose remote descriptor lives at `<server_url>/commands_version.json`
pub fn library_for(temp_dir: &TempDir, server_url: &str) -> CommandLibrary {
    let remote = HttpRemote::new(
        format!("{server_url}/commands_version.json"),
        Duration::from_secs(5),
    )
    .expect("client should build");
    CommandLibrary::new(CommandStore::new(temp_dir.path().join(DATABASE_FILE)), remote)
}

/// Sorted ids of everything in the catalog table
pub async fn catalog_ids(store: &CommandStore) -> Vec<String> {
    let mut ids: Vec<String> = store
        .catalog()
        .get_all()
        .await
        .expect("catalog should be readable")
        .into_iter()
        .map(|e| e.id)
        .collect();
    ids.sort();
    ids
}
