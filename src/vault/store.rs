//! The collection of stored vault records.
//!
//! `VaultStore` owns the state document and a persistence port.  Every
//! mutation is applied to a copy of the document, saved through the
//! port, and only then swapped in, so a failed write leaves both the
//! disk and the in-memory view untouched.  Records are always replaced
//! whole and keep their relative order.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info};

use super::persistence::StatePersistence;
use super::record::{PersistedState, RecordUpdate, VaultRecord};
use crate::errors::{PassordrError, Result};

/// A store shared between threads.  The mutex serializes writes.
pub type SharedVaultStore<P> = Arc<Mutex<VaultStore<P>>>;

pub struct VaultStore<P: StatePersistence> {
    state: PersistedState,
    port: P,
}

impl<P: StatePersistence> VaultStore<P> {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Load the state from `port`, seeding a default vault if nothing is
    /// stored yet (or the stored list is empty).
    pub fn open(port: P) -> Result<Self> {
        let (mut state, mut dirty) = match port.load()? {
            Some(state) => (state, false),
            None => (PersistedState::seed()?, true),
        };

        if state.stored_vaults.is_empty() {
            state = PersistedState {
                password_validity_ms: state.password_validity_ms,
                ..PersistedState::seed()?
            };
            dirty = true;
        }

        if !state
            .stored_vaults
            .iter()
            .any(|v| v.id == state.current_vault_id)
        {
            state.current_vault_id = state.stored_vaults[0].id.clone();
            dirty = true;
        }

        if dirty {
            port.save(&state)?;
            debug!("seeded vault state");
        }

        Ok(Self { state, port })
    }

    /// Wrap this store for sharing across threads.
    pub fn into_shared(self) -> SharedVaultStore<P> {
        Arc::new(Mutex::new(self))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// All records, in creation order.
    pub fn list(&self) -> &[VaultRecord] {
        &self.state.stored_vaults
    }

    pub fn get(&self, id: &str) -> Result<&VaultRecord> {
        self.state
            .stored_vaults
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| PassordrError::VaultNotFound(id.to_string()))
    }

    pub fn current_id(&self) -> &str {
        &self.state.current_vault_id
    }

    /// The selected record.
    pub fn current(&self) -> Result<&VaultRecord> {
        self.get(&self.state.current_vault_id)
    }

    /// Inactivity window after which an open vault locks; zero disables it.
    pub fn password_validity(&self) -> Duration {
        Duration::from_millis(self.state.password_validity_ms)
    }

    /// The whole document as last persisted.
    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Apply `f` to a copy of the state, persist it, then keep it.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut PersistedState) -> Result<T>) -> Result<T> {
        let mut next = self.state.clone();
        let out = f(&mut next)?;
        self.port.save(&next)?;
        self.state = next;
        Ok(out)
    }

    fn position(state: &PersistedState, id: &str) -> Result<usize> {
        state
            .stored_vaults
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| PassordrError::VaultNotFound(id.to_string()))
    }

    /// Create a new password-less vault and append it.
    pub fn create(&mut self, name: &str) -> Result<VaultRecord> {
        let name = validate_name(name)?;
        let record = VaultRecord::generate(&name)?;
        let created = record.clone();
        self.mutate(|state| {
            state.stored_vaults.push(record);
            Ok(())
        })?;
        info!(vault_id = %created.id, "vault created");
        Ok(created)
    }

    /// Create a new vault and make it the current one.
    pub fn create_and_select(&mut self, name: &str) -> Result<VaultRecord> {
        let record = self.create(name)?;
        self.select(&record.id)?;
        Ok(record)
    }

    /// Make `id` the current vault.
    pub fn select(&mut self, id: &str) -> Result<()> {
        self.mutate(|state| {
            Self::position(state, id)?;
            state.current_vault_id = id.to_string();
            Ok(())
        })
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        self.replace(
            id,
            RecordUpdate {
                name: Some(name),
                ..RecordUpdate::default()
            },
        )?;
        Ok(())
    }

    /// Delete a vault.  The last remaining vault cannot be deleted.
    ///
    /// If the deleted vault was selected, the first remaining one
    /// becomes current.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.mutate(|state| {
            let idx = Self::position(state, id)?;
            if state.stored_vaults.len() == 1 {
                return Err(PassordrError::LastVaultDeletion);
            }
            state.stored_vaults.remove(idx);
            if state.current_vault_id == id {
                state.current_vault_id = state.stored_vaults[0].id.clone();
            }
            Ok(())
        })?;
        info!(vault_id = %id, "vault deleted");
        Ok(())
    }

    /// Merge `update` into the record and stamp `last_update`.
    pub fn replace(&mut self, id: &str, update: RecordUpdate) -> Result<&VaultRecord> {
        let idx = self.mutate(|state| {
            let idx = Self::position(state, id)?;
            let mut record = state.stored_vaults[idx].clone();
            update.apply(&mut record);
            state.stored_vaults[idx] = record;
            Ok(idx)
        })?;
        debug!(vault_id = %id, "vault record replaced");
        Ok(&self.state.stored_vaults[idx])
    }

    pub fn set_password_validity(&mut self, validity: Duration) -> Result<()> {
        let ms = u64::try_from(validity.as_millis()).unwrap_or(u64::MAX);
        self.mutate(|state| {
            state.password_validity_ms = ms;
            Ok(())
        })
    }
}

/// Trim a vault name and reject blank ones.
fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PassordrError::CommandFailed(
            "vault name cannot be empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::persistence::MemoryPersistence;
    use crate::vault::record::{BackupMetadata, DEFAULT_VAULT_NAME};

    fn store() -> VaultStore<MemoryPersistence> {
        VaultStore::open(MemoryPersistence::new()).unwrap()
    }

    #[test]
    fn open_seeds_default_vault() {
        let port = MemoryPersistence::new();
        let store = VaultStore::open(port.clone()).unwrap();
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.current().unwrap().name, DEFAULT_VAULT_NAME);
        assert!(port.snapshot().is_some(), "seeded state must be persisted");
    }

    #[test]
    fn open_repairs_empty_vault_list() {
        let port = MemoryPersistence::new();
        let mut state = PersistedState::seed().unwrap();
        state.stored_vaults.clear();
        state.password_validity_ms = 1234;
        port.save(&state).unwrap();

        let store = VaultStore::open(port).unwrap();
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.password_validity(), Duration::from_millis(1234));
    }

    #[test]
    fn create_appends_in_order() {
        let mut store = store();
        let a = store.create("a").unwrap();
        let b = store.create("b").unwrap();
        let ids: Vec<_> = store.list().iter().map(|v| v.id.clone()).collect();
        assert_eq!(&ids[1..], &[a.id, b.id]);
    }

    #[test]
    fn rename_trims_and_rejects_blank() {
        let mut store = store();
        let id = store.current_id().to_string();
        store.rename(&id, "  Work  ").unwrap();
        assert_eq!(store.get(&id).unwrap().name, "Work");
        assert!(store.rename(&id, "   ").is_err());
    }

    #[test]
    fn delete_last_vault_is_rejected() {
        let mut store = store();
        let id = store.current_id().to_string();
        let before = store.state().clone();
        assert!(matches!(
            store.delete(&id),
            Err(PassordrError::LastVaultDeletion)
        ));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn delete_current_selects_first_remaining() {
        let mut store = store();
        let first = store.current_id().to_string();
        let second = store.create_and_select("second").unwrap();
        assert_eq!(store.current_id(), second.id);

        store.delete(&second.id).unwrap();
        assert_eq!(store.current_id(), first);
    }

    #[test]
    fn replace_merges_and_stamps() {
        let mut store = store();
        let id = store.current_id().to_string();
        let before = store.get(&id).unwrap().clone();

        let updated = store
            .replace(
                &id,
                RecordUpdate {
                    local_file_backup: Some(BackupMetadata::now()),
                    ..RecordUpdate::default()
                },
            )
            .unwrap()
            .clone();

        assert_eq!(updated.encrypted_blob, before.encrypted_blob);
        assert!(updated.local_file_backup.is_some());
        assert!(updated.last_update >= before.last_update);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut store = store();
        assert!(matches!(
            store.select("nope"),
            Err(PassordrError::VaultNotFound(_))
        ));
    }

    #[test]
    fn shared_store_serializes_writers() {
        let shared = store().into_shared();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    let mut store = shared.lock().unwrap();
                    store.create(&format!("vault {i}")).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = shared.lock().unwrap();
        assert_eq!(store.list().len(), 5);
        assert_eq!(store.port.snapshot().unwrap().stored_vaults.len(), 5);
    }
}
