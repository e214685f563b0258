//! Vault module — encrypted vault records and their decrypted content.
//!
//! This module provides:
//! - `VaultSnapshot`, `Service` and history types (`snapshot`)
//! - The history diff recorded on every save (`history`)
//! - `WorkingCopy`, the in-memory edit buffer (`editor`)
//! - `VaultRecord` and the versioned state document (`record`)
//! - Persistence ports for that document (`persistence`)
//! - `VaultStore`, the multi-vault collection (`store`)

pub mod editor;
pub mod history;
pub mod persistence;
pub mod record;
pub mod snapshot;
pub mod store;

// Re-export the most commonly used items.
pub use editor::WorkingCopy;
pub use history::diff;
pub use persistence::{JsonFilePersistence, MemoryPersistence, StatePersistence};
#[cfg(feature = "sqlite-store")]
pub use persistence::SqlitePersistence;
pub use record::{
    BackupMetadata, PersistedState, RecordUpdate, VaultRecord, DEFAULT_PASSWORD,
    DEFAULT_VAULT_NAME,
};
pub use snapshot::{HintChange, HistoryEntry, Service, ServiceUpdate, UpdateType, VaultSnapshot};
pub use store::{SharedVaultStore, VaultStore};
