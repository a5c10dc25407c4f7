//! Host-facing API
//!
//! [`CommandLibrary`] bundles the store and the reconciler behind the small
//! set of calls the UI layer makes. It is constructed once at startup and
//! shared (for example behind an `Arc`) with every consumer.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Deployment, PaletteConfig};
use crate::entry::{CatalogEntry, Command, CustomEntry, NewCustomEntry};
use crate::error::StoreResult;
use crate::store::CommandStore;
use crate::sync::{HttpRemote, Reconciler, RemoteSource, SyncOutcome};

pub struct CommandLibrary {
    store: CommandStore,
    reconciler: Reconciler,
}

impl CommandLibrary {
    pub fn new(store: CommandStore, remote: impl RemoteSource + 'static) -> Self {
        Self {
            store,
            reconciler: Reconciler::new(remote),
        }
    }

    /// Build from configuration: database at the deployment's location,
    /// HTTP remote at the configured descriptor URL. Does not open the store.
    pub fn from_config(config: &PaletteConfig, deployment: Deployment) -> Result<Self> {
        let path = config.database_path(deployment)?;
        let remote = HttpRemote::from_config(config).context("Failed to set up catalog sync")?;
        info!("Using command store at {}", path.display());
        Ok(Self::new(CommandStore::new(path), remote))
    }

    pub fn store(&self) -> &CommandStore {
        &self.store
    }

    /// Open the store. Errors here are fatal to startup.
    pub async fn initialize(&self) -> StoreResult<()> {
        self.store.initialize().await
    }

    pub async fn catalog_entries(&self) -> StoreResult<Vec<CatalogEntry>> {
        self.store.catalog().get_all().await
    }

    /// User-authored entries, tagged custom with the local-only version
    pub async fn custom_entries(&self) -> StoreResult<Vec<Command>> {
        let custom = self.store.custom().get_all().await?;
        Ok(custom.into_iter().map(Command::from).collect())
    }

    /// Catalog entries followed by custom entries, each tagged with its origin
    pub async fn all_commands(&self) -> StoreResult<Vec<Command>> {
        let catalog = self.catalog_entries().await?;
        let custom = self.custom_entries().await?;

        let mut commands = Vec::with_capacity(catalog.len() + custom.len());
        commands.extend(catalog.into_iter().map(Command::from));
        commands.extend(custom);
        Ok(commands)
    }

    pub async fn add_custom_entry(&self, entry: NewCustomEntry) -> StoreResult<CustomEntry> {
        self.store.custom().add(entry).await
    }

    /// Returns whether an entry was removed
    pub async fn delete_custom_entry(&self, id: &str) -> StoreResult<bool> {
        self.store.custom().delete(id).await
    }

    pub fn local_version(&self) -> u32 {
        self.store.local_version()
    }

    /// Run one reconciliation pass. Never fails; inspect the outcome.
    pub async fn reconcile(&self) -> SyncOutcome {
        self.reconciler.reconcile(&self.store).await
    }
}
