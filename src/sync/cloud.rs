//! Cloud backups over a private, application-scoped object store.
//!
//! The provider (and how its access token is obtained) lives behind
//! `CloudStorage`.  Objects are named by vault id and described by
//! vault name, so several backups of the same vault can coexist.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BackupPayload, Synchronizer, SynchronizerKind};
use crate::errors::{PassordrError, Result};
use crate::vault::{BackupMetadata, VaultRecord};

/// Metadata of one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub modified_time: DateTime<Utc>,
}

/// Minimal object-store API the cloud backend needs.
pub trait CloudStorage {
    /// Store `body` and return the new object's id.
    fn upload(&self, name: &str, description: &str, body: &str) -> Result<String>;
    fn download(&self, id: &str) -> Result<Vec<u8>>;
    fn list(&self) -> Result<Vec<CloudObject>>;
    fn delete(&self, id: &str) -> Result<()>;
}

pub struct CloudSynchronizer<S: CloudStorage> {
    storage: S,
}

impl<S: CloudStorage> CloudSynchronizer<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Backups available for restore, newest first.
    pub fn list(&self) -> Result<Vec<CloudObject>> {
        let mut objects = self.storage.list()?;
        objects.sort_by(|a, b| b.modified_time.cmp(&a.modified_time));
        Ok(objects)
    }

    /// Delete the given backups.  Stops at the first failure.
    pub fn delete_backups(&self, ids: &[String]) -> Result<()> {
        for id in ids {
            self.storage.delete(id)?;
        }
        Ok(())
    }
}

impl<S: CloudStorage> Synchronizer for CloudSynchronizer<S> {
    fn kind(&self) -> SynchronizerKind {
        SynchronizerKind::Cloud
    }

    fn backup(&self, vault: &VaultRecord) -> Result<BackupMetadata> {
        let body = BackupPayload::from_record(vault).to_json()?;
        self.storage.upload(&vault.id, &vault.name, &body)?;
        Ok(BackupMetadata::now())
    }

    fn restore(&self, backup_id: Option<&str>, _vault: &VaultRecord) -> Result<BackupPayload> {
        let id = backup_id.ok_or(PassordrError::MissingBackupId)?;
        let body = self.storage.download(id)?;
        BackupPayload::parse(&body)
    }
}

// ---------------------------------------------------------------------------
// In-memory storage
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryObjects {
    next_id: u64,
    offline: bool,
    objects: Vec<(CloudObject, Vec<u8>)>,
}

/// In-memory `CloudStorage`.  Clones share the same objects.
///
/// `set_offline(true)` makes every call fail with `Network`, which is
/// how tests exercise transient provider failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryCloudStorage {
    inner: Arc<Mutex<MemoryObjects>>,
}

impl MemoryCloudStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.offline = offline;
        }
    }

    /// Store a raw body directly, bypassing the payload encoder.
    pub fn insert_raw(&self, name: &str, body: &[u8]) -> Result<String> {
        let mut inner = self.online()?;
        Ok(Self::push(&mut inner, name, "", body.to_vec()))
    }

    fn online(&self) -> Result<std::sync::MutexGuard<'_, MemoryObjects>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| PassordrError::StorageError("cloud memory poisoned".into()))?;
        if inner.offline {
            return Err(PassordrError::Network("storage unreachable".into()));
        }
        Ok(inner)
    }

    fn push(inner: &mut MemoryObjects, name: &str, description: &str, body: Vec<u8>) -> String {
        inner.next_id += 1;
        let id = format!("obj-{}", inner.next_id);
        inner.objects.push((
            CloudObject {
                id: id.clone(),
                name: name.to_string(),
                description: description.to_string(),
                modified_time: Utc::now(),
            },
            body,
        ));
        id
    }
}

impl CloudStorage for MemoryCloudStorage {
    fn upload(&self, name: &str, description: &str, body: &str) -> Result<String> {
        let mut inner = self.online()?;
        Ok(Self::push(&mut inner, name, description, body.as_bytes().to_vec()))
    }

    fn download(&self, id: &str) -> Result<Vec<u8>> {
        let inner = self.online()?;
        inner
            .objects
            .iter()
            .find(|(meta, _)| meta.id == id)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| PassordrError::Network(format!("object {id} not found")))
    }

    fn list(&self) -> Result<Vec<CloudObject>> {
        let inner = self.online()?;
        Ok(inner.objects.iter().map(|(meta, _)| meta.clone()).collect())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.online()?;
        inner.objects.retain(|(meta, _)| meta.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_names_object_after_vault() {
        let storage = MemoryCloudStorage::new();
        let sync = CloudSynchronizer::new(storage.clone());
        let vault = VaultRecord::generate("Personal").unwrap();

        sync.backup(&vault).unwrap();
        let listed = sync.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, vault.id);
        assert_eq!(listed[0].description, "Personal");
    }

    #[test]
    fn restore_requires_id() {
        let sync = CloudSynchronizer::new(MemoryCloudStorage::new());
        let vault = VaultRecord::generate("v").unwrap();
        assert!(matches!(
            sync.restore(None, &vault),
            Err(PassordrError::MissingBackupId)
        ));
    }

    #[test]
    fn offline_storage_surfaces_network_error() {
        let storage = MemoryCloudStorage::new();
        let sync = CloudSynchronizer::new(storage.clone());
        storage.set_offline(true);
        let vault = VaultRecord::generate("v").unwrap();
        assert!(matches!(sync.backup(&vault), Err(PassordrError::Network(_))));

        storage.set_offline(false);
        assert!(sync.backup(&vault).is_ok());
    }

    #[test]
    fn delete_backups_removes_selected() {
        let storage = MemoryCloudStorage::new();
        let sync = CloudSynchronizer::new(storage.clone());
        let vault = VaultRecord::generate("v").unwrap();
        sync.backup(&vault).unwrap();
        sync.backup(&vault).unwrap();

        let first = sync.list().unwrap()[0].id.clone();
        sync.delete_backups(&[first.clone()]).unwrap();
        let remaining = sync.list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_ne!(remaining[0].id, first);
    }
}
