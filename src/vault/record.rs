//! Persisted vault records and the versioned state document holding them.
//!
//! A `VaultRecord` only carries the encrypted blob; the decrypted
//! content never reaches this layer.  JSON field names match the
//! shared `passordrVaults` document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::snapshot::VaultSnapshot;
use crate::errors::Result;

/// Password used for vaults created without one.
///
/// Password-less vaults are a convenience, not a security boundary:
/// anyone with this build can open them.
pub const DEFAULT_PASSWORD: &str = "passordr";

/// Display name given to freshly created vaults.
pub const DEFAULT_VAULT_NAME: &str = "New vault";

/// Current state document version.
pub const STATE_VERSION: u32 = 1;

/// Default inactivity window before an open vault locks itself (5 minutes).
pub const DEFAULT_PASSWORD_VALIDITY_MS: u64 = 5 * 60 * 1000;

/// When a vault was last exported through one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    pub last_backup_date: DateTime<Utc>,
}

impl BackupMetadata {
    pub fn now() -> Self {
        Self {
            last_backup_date: Utc::now(),
        }
    }
}

/// One stored vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Immutable identifier assigned at creation.
    #[serde(rename = "clientId")]
    pub id: String,

    pub name: String,

    /// `false` means the blob is encrypted with `DEFAULT_PASSWORD`.
    #[serde(rename = "password")]
    pub has_password: bool,

    /// base64(salt || nonce || ciphertext).
    #[serde(rename = "encryptedData")]
    pub encrypted_blob: String,

    #[serde(rename = "lastUpdate", default = "Utc::now")]
    pub last_update: DateTime<Utc>,

    #[serde(
        rename = "localFileSynchronizer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub local_file_backup: Option<BackupMetadata>,

    #[serde(
        rename = "googleDriveSynchronizer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cloud_backup: Option<BackupMetadata>,
}

impl VaultRecord {
    /// A new password-less vault holding an empty snapshot.
    pub fn generate(name: &str) -> Result<Self> {
        let encrypted_blob = VaultSnapshot::default().seal(DEFAULT_PASSWORD)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            has_password: false,
            encrypted_blob,
            last_update: Utc::now(),
            local_file_backup: None,
            cloud_backup: None,
        })
    }

    /// The password that actually decrypts this record's blob.
    ///
    /// Returns `None` when the vault is password protected and no
    /// password was supplied.
    pub fn effective_password<'a>(&self, supplied: Option<&'a str>) -> Option<&'a str> {
        if self.has_password {
            supplied.filter(|p| !p.is_empty())
        } else {
            Some(DEFAULT_PASSWORD)
        }
    }
}

/// Partial update merged into a record by `VaultStore::replace`.
///
/// Fields left as `None` are kept as they are.
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    pub name: Option<String>,
    pub has_password: Option<bool>,
    pub encrypted_blob: Option<String>,
    pub local_file_backup: Option<BackupMetadata>,
    pub cloud_backup: Option<BackupMetadata>,
}

impl RecordUpdate {
    /// Update replacing the encrypted content of a record.
    pub fn content(has_password: bool, encrypted_blob: String) -> Self {
        Self {
            has_password: Some(has_password),
            encrypted_blob: Some(encrypted_blob),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, record: &mut VaultRecord) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(has_password) = self.has_password {
            record.has_password = has_password;
        }
        if let Some(blob) = self.encrypted_blob {
            record.encrypted_blob = blob;
        }
        if let Some(meta) = self.local_file_backup {
            record.local_file_backup = Some(meta);
        }
        if let Some(meta) = self.cloud_backup {
            record.cloud_backup = Some(meta);
        }
        record.last_update = Utc::now();
    }
}

fn default_version() -> u32 {
    STATE_VERSION
}

fn default_password_validity_ms() -> u64 {
    DEFAULT_PASSWORD_VALIDITY_MS
}

/// The whole persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub stored_vaults: Vec<VaultRecord>,

    #[serde(rename = "currentVaultClientId", default)]
    pub current_vault_id: String,

    /// Zero disables auto-lock.
    #[serde(default = "default_password_validity_ms")]
    pub password_validity_ms: u64,
}

impl PersistedState {
    /// A fresh state with a single default vault selected.
    pub fn seed() -> Result<Self> {
        let vault = VaultRecord::generate(DEFAULT_VAULT_NAME)?;
        Ok(Self {
            version: STATE_VERSION,
            current_vault_id: vault.id.clone(),
            stored_vaults: vec![vault],
            password_validity_ms: DEFAULT_PASSWORD_VALIDITY_MS,
        })
    }
}
