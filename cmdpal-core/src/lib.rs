//! cmdpal core library
//!
//! Local storage for a searchable command reference, kept in sync with a
//! remote catalog.
//!
//! # Architecture
//!
//! ```text
//! Remote (static hosting)
//!     │
//!     ├── commands_version.json  ← {latestVersion, dataUrl}
//!     └── commands.json          ← full catalog snapshot
//!            │
//!            ▼
//!     sync::Reconciler           ← one pass per call, remote wins if newer
//!            │
//!            ▼
//!     store::CommandStore        ← SQLite: commands + custom_commands
//!            │
//!            ▼
//!     library::CommandLibrary    ← API consumed by the UI layer
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod library;
pub mod store;
pub mod sync;

pub use config::{Deployment, PaletteConfig};
pub use entry::{
    CatalogEntry, Command, CustomEntry, NewCustomEntry, Origin, RemoteVersionDescriptor,
    Variation,
};
pub use error::{StoreError, SyncError};
pub use library::CommandLibrary;
pub use store::CommandStore;
pub use sync::{HttpRemote, Reconciler, RemoteSource, SyncOutcome, SyncStage};
