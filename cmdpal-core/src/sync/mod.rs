//! Catalog reconciliation
//!
//! One pass compares the local data version against the remote descriptor
//! and, when the remote is strictly newer, downloads the snapshot and
//! replaces the local catalog with it:
//!
//! ```text
//! Start ──descriptor──▶ VersionFetched ──remote <= local──▶ UpToDate
//!                            │
//!                            └──remote > local──▶ Downloading ──ok──▶ Applying ──ok──▶ Synced
//!
//! any fetch or apply failure ──▶ Failed (local catalog unchanged)
//! ```
//!
//! Failures are reported in the returned [`SyncOutcome`], never raised: the
//! host keeps working with whatever data is already stored.

mod remote;

pub use remote::{HttpRemote, RemoteSource};

use std::fmt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::store::CommandStore;

/// Step of a pass at which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    /// Opening the local store to read its version
    LocalVersion,
    /// Fetching the remote version descriptor
    Descriptor,
    /// Downloading the remote snapshot
    Snapshot,
    /// Writing the snapshot into the local store
    Apply,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncStage::LocalVersion => "local version",
            SyncStage::Descriptor => "version descriptor",
            SyncStage::Snapshot => "snapshot download",
            SyncStage::Apply => "snapshot apply",
        })
    }
}

/// Terminal state of one reconciliation pass
#[derive(Debug)]
pub enum SyncOutcome {
    /// Remote is not newer; nothing was downloaded or written
    UpToDate {
        local_version: u32,
        remote_version: u32,
    },
    /// Snapshot applied
    Synced {
        previous_version: u32,
        current_version: u32,
        applied: usize,
    },
    /// Pass stopped; the local catalog is exactly as it was before
    Failed { stage: SyncStage, error: SyncError },
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SyncOutcome::Failed { .. })
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            SyncOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::UpToDate { local_version, .. } => {
                write!(f, "Local command data is up to date (version {local_version})")
            }
            SyncOutcome::Synced {
                previous_version,
                current_version,
                applied,
            } => write!(
                f,
                "Updated {applied} commands (version {previous_version} -> {current_version})"
            ),
            SyncOutcome::Failed { stage, error } => {
                write!(f, "Sync failed during {stage}: {error}")
            }
        }
    }
}

/// Drives reconciliation passes against one remote source
pub struct Reconciler {
    remote: Box<dyn RemoteSource>,
    pass_lock: Mutex<()>,
}

impl Reconciler {
    pub fn new(remote: impl RemoteSource + 'static) -> Self {
        Self {
            remote: Box::new(remote),
            pass_lock: Mutex::new(()),
        }
    }

    /// Run one pass. Concurrent calls are serialized.
    ///
    /// Dropping the returned future abandons an in-flight fetch; a snapshot
    /// write that has begun rolls back as a whole.
    pub async fn reconcile(&self, store: &CommandStore) -> SyncOutcome {
        let _pass = self.pass_lock.lock().await;

        let outcome = self.run_pass(store).await;
        match &outcome {
            SyncOutcome::Failed { stage, error } => {
                warn!("Sync via {} failed during {}: {}", self.remote.name(), stage, error);
            }
            other => info!("{}", other),
        }
        outcome
    }

    async fn run_pass(&self, store: &CommandStore) -> SyncOutcome {
        if let Err(e) = store.initialize().await {
            return SyncOutcome::Failed {
                stage: SyncStage::LocalVersion,
                error: e.into(),
            };
        }
        let local_version = store.local_version();
        debug!("Local command data version: {}", local_version);

        let descriptor = match self.remote.fetch_descriptor().await {
            Ok(descriptor) => descriptor,
            Err(error) => {
                return SyncOutcome::Failed {
                    stage: SyncStage::Descriptor,
                    error,
                }
            }
        };
        debug!(
            "Remote version found: {}, data URL: {}",
            descriptor.latest_version, descriptor.data_url
        );

        if descriptor.latest_version <= local_version {
            return SyncOutcome::UpToDate {
                local_version,
                remote_version: descriptor.latest_version,
            };
        }

        info!(
            "New catalog version found: {}. Starting download...",
            descriptor.latest_version
        );

        let snapshot = match self.remote.fetch_snapshot(&descriptor.data_url).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                return SyncOutcome::Failed {
                    stage: SyncStage::Snapshot,
                    error,
                }
            }
        };
        debug!("Downloaded {} catalog commands", snapshot.len());

        if snapshot.is_empty() {
            warn!("Remote snapshot is empty; keeping local catalog");
        }

        let current_version = match store.catalog().bulk_replace(&snapshot).await {
            Ok(version) => version,
            Err(e) => {
                return SyncOutcome::Failed {
                    stage: SyncStage::Apply,
                    error: e.into(),
                }
            }
        };

        if current_version < descriptor.latest_version {
            warn!(
                "Snapshot max version {} is below advertised version {}",
                current_version, descriptor.latest_version
            );
        }

        SyncOutcome::Synced {
            previous_version: local_version,
            current_version,
            applied: snapshot.len(),
        }
    }
}
