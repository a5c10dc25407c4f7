//! Store and sync error types

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the local command store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database file could not be opened or created. Fatal to startup.
    #[error("Failed to open command store at {path}")]
    StorageInit {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to read from command store ({operation})")]
    StorageRead {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A stored variations blob no longer parses
    #[error("Stored command '{id}' has corrupt variations data")]
    CorruptRow {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write to command store ({operation})")]
    StorageWrite {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to encode variations for command '{id}'")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("A custom command with id '{id}' already exists")]
    DuplicateKey { id: String },

    #[error("Invalid custom command: {reason}")]
    InvalidEntry { reason: String },
}

/// Failures of a reconciliation pass. Never fatal to the host.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to create HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch version descriptor from {url}")]
    DescriptorFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch version descriptor: HTTP {status} from {url}")]
    DescriptorHttp {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to download catalog snapshot from {url}")]
    SnapshotFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to download catalog snapshot: HTTP {status} from {url}")]
    SnapshotFetchHttp {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The local store failed while reading the version or applying a snapshot
    #[error("Local command store failed during sync")]
    Store(#[from] StoreError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
