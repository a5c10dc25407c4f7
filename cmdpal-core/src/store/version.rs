//! Cached local data version

use std::sync::atomic::{AtomicU32, Ordering};

/// Highest catalog version as of the last committed read or write.
///
/// 0 means the catalog is empty and has never been synced. Only the store
/// publishes new values, and only after the transaction that produced them
/// has committed.
#[derive(Debug, Default)]
pub struct VersionTracker {
    current: AtomicU32,
}

impl VersionTracker {
    pub fn get(&self) -> u32 {
        self.current.load(Ordering::Acquire)
    }

    pub(crate) fn publish(&self, version: u32) {
        let previous = self.current.swap(version, Ordering::AcqRel);
        if previous != version {
            tracing::debug!("Local data version {} -> {}", previous, version);
        }
    }
}
