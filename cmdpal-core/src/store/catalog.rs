//! Versioned catalog table

use tracing::{debug, info};

use super::codec::{encode_tags, encode_variations, CatalogRow};
use super::{max_catalog_version, CommandStore};
use crate::entry::CatalogEntry;
use crate::error::{StoreError, StoreResult};

const REPLACE_COMMAND: &str = r#"
INSERT OR REPLACE INTO commands (id, name, platform, category, tags, variations_json, version)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

const SELECT_COMMANDS: &str =
    "SELECT id, name, platform, category, tags, variations_json, version FROM commands";

/// View of the `commands` table
#[derive(Debug, Clone, Copy)]
pub struct CatalogTable<'a> {
    store: &'a CommandStore,
}

impl<'a> CatalogTable<'a> {
    pub(super) fn new(store: &'a CommandStore) -> Self {
        Self { store }
    }

    /// Insert or overwrite every entry by id in a single transaction.
    ///
    /// Either the whole batch commits or the table is left as it was. On
    /// success the local data version is recomputed from the full table and
    /// returned; an empty batch is a no-op.
    ///
    /// If the future is dropped after the commit lands but before the version
    /// is published, the cached version lags the table until the store is
    /// reopened; the next sync pass then downloads the snapshot again.
    pub async fn bulk_replace(&self, entries: &[CatalogEntry]) -> StoreResult<u32> {
        if entries.is_empty() {
            debug!("Skipping catalog replace: no entries");
            return Ok(self.store.local_version());
        }

        info!("Replacing {} catalog commands", entries.len());

        let pool = self.store.pool().await?;
        let _guard = self.store.lock_writes().await;

        let mut tx = pool.begin().await.map_err(write_error("begin transaction"))?;

        // Any early return drops `tx`, which rolls the batch back
        for entry in entries {
            let variations = encode_variations(&entry.id, &entry.variations)?;

            sqlx::query(REPLACE_COMMAND)
                .bind(&entry.id)
                .bind(&entry.name)
                .bind(&entry.platform)
                .bind(&entry.category)
                .bind(encode_tags(&entry.tags))
                .bind(variations)
                .bind(i64::from(entry.effective_version()))
                .execute(&mut *tx)
                .await
                .map_err(|source| {
                    tracing::warn!("Catalog replace failed at '{}': {}", entry.id, source);
                    StoreError::StorageWrite {
                        operation: "replace command",
                        source,
                    }
                })?;
        }

        let version = max_catalog_version(&mut *tx)
            .await
            .map_err(write_error("recompute version"))?;

        tx.commit().await.map_err(write_error("commit"))?;

        self.store.publish_version(version);
        info!("Catalog replace complete. Local data version: {}", version);
        Ok(version)
    }

    /// Snapshot of every catalog row, in no particular order
    pub async fn get_all(&self) -> StoreResult<Vec<CatalogEntry>> {
        let pool = self.store.pool().await?;

        let rows: Vec<CatalogRow> = sqlx::query_as(SELECT_COMMANDS)
            .fetch_all(pool)
            .await
            .map_err(|source| StoreError::StorageRead {
                operation: "list commands",
                source,
            })?;

        debug!("Found {} catalog commands", rows.len());
        rows.into_iter().map(CatalogRow::into_entry).collect()
    }

    /// Cached local data version
    pub fn version(&self) -> u32 {
        self.store.local_version()
    }
}

fn write_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |source| StoreError::StorageWrite { operation, source }
}
