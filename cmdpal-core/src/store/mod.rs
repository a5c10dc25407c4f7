//! Embedded SQLite command store
//!
//! One database file holds two independent tables:
//!
//! ```text
//! commands.sqlite
//!     ├── commands         ← versioned catalog, replaced from remote snapshots
//!     └── custom_commands  ← user-authored entries, never version-tracked
//! ```
//!
//! [`CommandStore`] owns the connection pool and is shared by both table
//! views. The pool is opened on the first call to [`CommandStore::initialize`]
//! (or lazily by the first read or write) and held for the life of the store.
//! All mutations are serialized through a single write lock.

mod catalog;
pub mod codec;
mod custom;
mod version;

pub use catalog::CatalogTable;
pub use custom::CustomTable;
pub use version::VersionTracker;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Executor, Sqlite, SqlitePool};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Default database file name
pub const DATABASE_FILE: &str = "commands.sqlite";

const CREATE_COMMANDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS commands (
    id TEXT PRIMARY KEY NOT NULL CHECK (id <> ''),
    name TEXT,
    platform TEXT,
    category TEXT,
    tags TEXT,
    variations_json TEXT,
    version INTEGER NOT NULL DEFAULT 1
)
"#;

const CREATE_CUSTOM_COMMANDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS custom_commands (
    id TEXT PRIMARY KEY NOT NULL CHECK (id <> ''),
    name TEXT,
    platform TEXT,
    category TEXT,
    tags TEXT,
    variations_json TEXT,
    created_at INTEGER
)
"#;

/// Extended SQLite result codes for key collisions.
///
/// See <https://sqlite.org/rescode.html#constraint_primarykey>
const SQLITE_PRIMARY_KEY_VIOLATION: &str = "1555";
const SQLITE_UNIQUE_VIOLATION: &str = "2067";

/// Process-wide handle to the local command database
#[derive(Debug)]
pub struct CommandStore {
    path: PathBuf,
    pool: OnceCell<SqlitePool>,
    write_lock: Mutex<()>,
    version: VersionTracker,
}

impl CommandStore {
    /// Create a handle without touching the filesystem
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: OnceCell::new(),
            write_lock: Mutex::new(()),
            version: VersionTracker::default(),
        }
    }

    /// Create a handle and initialize it immediately
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self::new(path);
        store.initialize().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open or create the database, create missing tables and load the
    /// local data version. Later calls are no-ops.
    pub async fn initialize(&self) -> StoreResult<()> {
        self.pool().await.map(|_| ())
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Cached local data version; never touches storage
    pub fn local_version(&self) -> u32 {
        self.version.get()
    }

    /// The versioned catalog table
    pub fn catalog(&self) -> CatalogTable<'_> {
        CatalogTable::new(self)
    }

    /// The user-authored command table
    pub fn custom(&self) -> CustomTable<'_> {
        CustomTable::new(self)
    }

    /// Close the pool, checkpointing the WAL. The store cannot be reused.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            debug!("Closed command store at {}", self.path.display());
        }
    }

    pub(crate) async fn pool(&self) -> StoreResult<&SqlitePool> {
        self.pool.get_or_try_init(|| self.connect()).await
    }

    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub(crate) fn publish_version(&self, version: u32) {
        self.version.publish(version);
    }

    async fn connect(&self) -> StoreResult<SqlitePool> {
        info!("Initializing command store at {}", self.path.display());

        let init_error = |source: sqlx::Error| StoreError::StorageInit {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| init_error(sqlx::Error::Io(e)))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(init_error)?;

        for schema in [CREATE_COMMANDS_TABLE, CREATE_CUSTOM_COMMANDS_TABLE] {
            sqlx::query(schema)
                .execute(&pool)
                .await
                .map_err(init_error)?;
        }

        let version = max_catalog_version(&pool).await.map_err(init_error)?;
        self.version.publish(version);

        info!("Command store initialized. Local data version: {}", version);
        Ok(pool)
    }
}

/// `MAX(version)` over the whole catalog table, 0 when empty
pub(crate) async fn max_catalog_version<'e, E>(executor: E) -> Result<u32, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let max: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM commands")
        .fetch_one(executor)
        .await?;
    Ok(u32::try_from(max.max(0)).unwrap_or(u32::MAX))
}

/// Returns true if `e` is a primary key or unique constraint violation
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(inner) = e {
        if let Some(code) = inner.code() {
            return code == SQLITE_PRIMARY_KEY_VIOLATION || code == SQLITE_UNIQUE_VIOLATION;
        }
    }
    false
}
