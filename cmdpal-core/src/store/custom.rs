//! User-authored command table

use tracing::{debug, info};

use super::codec::{encode_tags, encode_variations, CustomRow};
use super::{is_unique_violation, CommandStore};
use crate::entry::{CustomEntry, NewCustomEntry};
use crate::error::{StoreError, StoreResult};

const INSERT_CUSTOM_COMMAND: &str = r#"
INSERT INTO custom_commands (id, name, platform, category, tags, variations_json, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

const SELECT_CUSTOM_COMMANDS: &str = r#"
SELECT id, name, platform, category, tags, variations_json, created_at
FROM custom_commands
ORDER BY created_at, rowid
"#;

/// View of the `custom_commands` table
#[derive(Debug, Clone, Copy)]
pub struct CustomTable<'a> {
    store: &'a CommandStore,
}

impl<'a> CustomTable<'a> {
    pub(super) fn new(store: &'a CommandStore) -> Self {
        Self { store }
    }

    /// Insert a new entry, stamping `created_at` with the current time
    pub async fn add(&self, entry: NewCustomEntry) -> StoreResult<CustomEntry> {
        entry
            .validate()
            .map_err(|reason| StoreError::InvalidEntry { reason })?;

        let variations = encode_variations(&entry.id, &entry.variations)?;
        let created_at = chrono::Utc::now().timestamp_millis();

        let pool = self.store.pool().await?;
        let _guard = self.store.lock_writes().await;

        sqlx::query(INSERT_CUSTOM_COMMAND)
            .bind(&entry.id)
            .bind(&entry.name)
            .bind(&entry.platform)
            .bind(&entry.category)
            .bind(encode_tags(&entry.tags))
            .bind(variations)
            .bind(created_at)
            .execute(pool)
            .await
            .map_err(|source| {
                if is_unique_violation(&source) {
                    StoreError::DuplicateKey {
                        id: entry.id.clone(),
                    }
                } else {
                    StoreError::StorageWrite {
                        operation: "insert custom command",
                        source,
                    }
                }
            })?;

        info!("Added custom command: {}", entry.name);

        Ok(CustomEntry {
            id: entry.id,
            name: entry.name,
            platform: entry.platform,
            category: entry.category,
            tags: entry.tags,
            variations: entry.variations,
            created_at,
        })
    }

    /// All custom rows, in insertion order
    pub async fn get_all(&self) -> StoreResult<Vec<CustomEntry>> {
        let pool = self.store.pool().await?;

        let rows: Vec<CustomRow> = sqlx::query_as(SELECT_CUSTOM_COMMANDS)
            .fetch_all(pool)
            .await
            .map_err(|source| StoreError::StorageRead {
                operation: "list custom commands",
                source,
            })?;

        debug!("Found {} custom commands", rows.len());
        rows.into_iter().map(CustomRow::into_entry).collect()
    }

    /// Remove an entry by id. Returns whether a row was removed; a missing id
    /// is not an error.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let pool = self.store.pool().await?;
        let _guard = self.store.lock_writes().await;

        let result = sqlx::query("DELETE FROM custom_commands WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|source| StoreError::StorageWrite {
                operation: "delete custom command",
                source,
            })?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!("Deleted custom command: {}", id);
        } else {
            debug!("No custom command with id '{}' to delete", id);
        }
        Ok(removed)
    }
}
