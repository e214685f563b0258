//! Backup synchronization of encrypted vault records.
//!
//! A `Synchronizer` moves the *encrypted* part of a record (its password
//! flag and blob) to and from an external medium.  Nothing here ever
//! decrypts: a restored vault is opened later with the password it was
//! backed up with, and the AEAD tag check at that point is the only
//! integrity check.
//!
//! This module provides:
//! - `BackupPayload`, the JSON document both backends exchange
//! - `Synchronizer`, implemented by `LocalFileSynchronizer` (`local_file`)
//!   and `CloudSynchronizer` (`cloud`)
//! - `backup_vault` / `restore_vault`, which wire a backend to the store

pub mod cloud;
#[cfg(feature = "google-drive")]
pub mod drive;
pub mod local_file;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{PassordrError, Result};
use crate::session::{Clock, SessionManager};
use crate::vault::{BackupMetadata, RecordUpdate, StatePersistence, VaultRecord, VaultStore};

pub use cloud::{CloudObject, CloudStorage, CloudSynchronizer, MemoryCloudStorage};
#[cfg(feature = "google-drive")]
pub use drive::DriveStorage;
pub use local_file::LocalFileSynchronizer;

/// Which backend a synchronizer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SynchronizerKind {
    LocalFile,
    Cloud,
}

impl std::fmt::Display for SynchronizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalFile => f.write_str("local-file"),
            Self::Cloud => f.write_str("cloud"),
        }
    }
}

/// The exported part of a vault record.
///
/// Field names are a compatibility contract shared with older backups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupPayload {
    pub password: bool,
    #[serde(rename = "encryptedData")]
    pub encrypted_data: String,
}

impl BackupPayload {
    pub fn from_record(record: &VaultRecord) -> Self {
        Self {
            password: record.has_password,
            encrypted_data: record.encrypted_blob.clone(),
        }
    }

    /// Validate and parse a backup document.
    ///
    /// Anything that is not a JSON object with a boolean `password` and
    /// a string `encryptedData` is `MalformedBackup`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| PassordrError::MalformedBackup(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| PassordrError::SerializationError(format!("backup payload: {e}")))
    }
}

/// A backup backend.
pub trait Synchronizer {
    fn kind(&self) -> SynchronizerKind;

    /// Export `vault` and report when it happened.
    fn backup(&self, vault: &VaultRecord) -> Result<BackupMetadata>;

    /// Fetch a previously exported payload.
    ///
    /// `backup_id` selects the backup; backends that can infer it from
    /// `vault` accept `None`.
    fn restore(&self, backup_id: Option<&str>, vault: &VaultRecord) -> Result<BackupPayload>;
}

/// Back up vault `vault_id` and record the backup date on it.
pub fn backup_vault<P, S>(
    store: &mut VaultStore<P>,
    sync: &S,
    vault_id: &str,
) -> Result<BackupMetadata>
where
    P: StatePersistence,
    S: Synchronizer + ?Sized,
{
    let record = store.get(vault_id)?.clone();
    let meta = sync.backup(&record)?;

    let update = match sync.kind() {
        SynchronizerKind::LocalFile => RecordUpdate {
            local_file_backup: Some(meta.clone()),
            ..RecordUpdate::default()
        },
        SynchronizerKind::Cloud => RecordUpdate {
            cloud_backup: Some(meta.clone()),
            ..RecordUpdate::default()
        },
    };
    store.replace(vault_id, update)?;

    info!(vault_id = %vault_id, backend = %sync.kind(), "vault backed up");
    Ok(meta)
}

/// Replace vault `vault_id`'s encrypted content with a backup.
///
/// Any open session on that vault is wiped; the restored vault must be
/// unlocked again with the password it was backed up with.
pub fn restore_vault<P, S, C>(
    store: &mut VaultStore<P>,
    session: &mut SessionManager<C>,
    sync: &S,
    backup_id: Option<&str>,
    vault_id: &str,
) -> Result<()>
where
    P: StatePersistence,
    S: Synchronizer + ?Sized,
    C: Clock,
{
    let record = store.get(vault_id)?.clone();
    let payload = sync.restore(backup_id, &record)?;

    store.replace(
        vault_id,
        RecordUpdate::content(payload.password, payload.encrypted_data),
    )?;
    session.forget_vault(vault_id);

    info!(vault_id = %vault_id, backend = %sync.kind(), "vault restored");
    Ok(())
}
