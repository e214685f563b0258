//! Session/lock manager: which vault is decrypted in memory, and for how long.
//!
//! The auto-lock timer is a deadline value.  It is checked by `tick()`
//! and before every read or write, so a `keep_alive` that happens before
//! the deadline always wins and an expired session can never be used.
//! There is at most one deadline; every refresh replaces it.

use std::time::{Duration, Instant};

use tracing::{debug, info};
use zeroize::Zeroizing;

use super::clock::{Clock, SystemClock};
use crate::crypto::{decrypt, encrypt};
use crate::errors::{PassordrError, Result};
use crate::vault::persistence::StatePersistence;
use crate::vault::record::{RecordUpdate, DEFAULT_PASSWORD};
use crate::vault::snapshot::VaultSnapshot;
use crate::vault::{VaultStore, WorkingCopy};

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Locked,
    /// Key derivation in progress inside `open`.
    Unlocking,
    Unlocked,
}

/// Secrets held while a vault is open.  Dropping it wipes the password.
struct OpenVault {
    vault_id: String,
    has_password: bool,
    snapshot: VaultSnapshot,
    password: Zeroizing<String>,
    deadline: Option<Instant>,
}

pub struct SessionManager<C: Clock = SystemClock> {
    clock: C,
    validity: Duration,
    state: LockState,
    open: Option<OpenVault>,
}

impl SessionManager<SystemClock> {
    /// Manager using the system clock.  A zero `validity` disables auto-lock.
    pub fn new(validity: Duration) -> Self {
        Self::with_clock(SystemClock, validity)
    }
}

impl<C: Clock> SessionManager<C> {
    pub fn with_clock(clock: C, validity: Duration) -> Self {
        Self {
            clock,
            validity,
            state: LockState::Locked,
            open: None,
        }
    }

    // ------------------------------------------------------------------
    // Timer
    // ------------------------------------------------------------------

    fn next_deadline(&self) -> Option<Instant> {
        (!self.validity.is_zero()).then(|| self.clock.now() + self.validity)
    }

    /// Lock if the inactivity deadline has passed.  Idempotent.
    pub fn tick(&mut self) -> LockState {
        let expired = self
            .open
            .as_ref()
            .and_then(|o| o.deadline)
            .is_some_and(|deadline| self.clock.now() >= deadline);

        if expired {
            self.wipe();
            info!("vault auto-locked after inactivity");
        }
        self.state
    }

    /// Push the deadline to `now + validity`.
    ///
    /// Fails with `PasswordExpired` if the session already locked.
    pub fn keep_alive(&mut self) -> Result<()> {
        self.tick();
        let deadline = self.next_deadline();
        let open = self.open.as_mut().ok_or(PassordrError::PasswordExpired)?;
        open.deadline = deadline;
        Ok(())
    }

    /// Change the inactivity window; an open session is re-armed with it.
    pub fn set_password_validity(&mut self, validity: Duration) {
        self.validity = validity;
        if self.tick() == LockState::Unlocked {
            let deadline = self.next_deadline();
            if let Some(open) = self.open.as_mut() {
                open.deadline = deadline;
            }
        }
    }

    pub fn password_validity(&self) -> Duration {
        self.validity
    }

    /// When the session will lock, if it is open and the timer is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.open.as_ref().and_then(|o| o.deadline)
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn status(&mut self) -> LockState {
        self.tick()
    }

    pub fn unlocked_vault_id(&mut self) -> Option<&str> {
        self.tick();
        self.open.as_ref().map(|o| o.vault_id.as_str())
    }

    fn wipe(&mut self) {
        // Dropping `OpenVault` zeroizes the password.
        self.open = None;
        self.state = LockState::Locked;
    }

    fn require_open(&mut self) -> Result<&mut OpenVault> {
        self.keep_alive()?;
        self.open.as_mut().ok_or(PassordrError::PasswordExpired)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Decrypt the store's current vault.
    ///
    /// Vaults without a password open with the built-in default.  A
    /// session on another vault is wiped first.
    pub fn open<P: StatePersistence>(
        &mut self,
        store: &VaultStore<P>,
        password: Option<&str>,
    ) -> Result<&VaultSnapshot> {
        let record = store.current()?;

        if self
            .open
            .as_ref()
            .is_some_and(|o| o.vault_id != record.id)
        {
            self.wipe();
        }

        let effective = record
            .effective_password(password)
            .ok_or(PassordrError::PasswordExpired)?;

        self.state = LockState::Unlocking;
        let snapshot = match VaultSnapshot::unseal(&record.encrypted_blob, effective) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.state = if self.open.is_some() {
                    LockState::Unlocked
                } else {
                    LockState::Locked
                };
                debug!(vault_id = %record.id, "unlock failed");
                return Err(e);
            }
        };

        let deadline = self.next_deadline();
        self.state = LockState::Unlocked;
        info!(vault_id = %record.id, "vault unlocked");
        let open = self.open.insert(OpenVault {
            vault_id: record.id.clone(),
            has_password: record.has_password,
            snapshot,
            password: Zeroizing::new(effective.to_string()),
            deadline,
        });
        Ok(&open.snapshot)
    }

    /// Explicit lock.
    ///
    /// Password-less vaults stay open: there is nothing to protect.
    pub fn lock(&mut self) -> LockState {
        if self.tick() == LockState::Unlocked && self.open.as_ref().is_some_and(|o| o.has_password)
        {
            self.wipe();
            info!("vault locked");
        }
        self.state
    }

    /// Wipe the session regardless of the vault's password flag.
    pub fn force_lock(&mut self) {
        if self.open.is_some() {
            debug!("session wiped");
        }
        self.wipe();
    }

    /// Wipe the session if it belongs to `vault_id`.
    pub fn forget_vault(&mut self, vault_id: &str) {
        if self.open.as_ref().is_some_and(|o| o.vault_id == vault_id) {
            self.wipe();
        }
    }

    /// Switch to another vault.
    ///
    /// The old session is wiped and its deadline dropped before the new
    /// vault is selected.  A password-less vault is opened right away.
    pub fn select_vault<P: StatePersistence>(
        &mut self,
        store: &mut VaultStore<P>,
        vault_id: &str,
    ) -> Result<LockState> {
        store.get(vault_id)?;
        self.force_lock();
        store.select(vault_id)?;

        if !store.current()?.has_password {
            self.open(store, None)?;
        }
        Ok(self.state)
    }

    // ------------------------------------------------------------------
    // Reads and writes
    // ------------------------------------------------------------------

    /// The decrypted content.  Counts as activity.
    pub fn snapshot(&mut self) -> Result<&VaultSnapshot> {
        let open = self.require_open()?;
        Ok(&open.snapshot)
    }

    /// Start editing the open vault.
    pub fn edit(&mut self) -> Result<WorkingCopy> {
        let open = self.require_open()?;
        Ok(WorkingCopy::new(open.snapshot.clone()))
    }

    /// Re-encrypt `snapshot` and write it to the store.
    ///
    /// Fails with `PasswordExpired` if the session locked in between.
    pub fn save<P: StatePersistence>(
        &mut self,
        store: &mut VaultStore<P>,
        snapshot: VaultSnapshot,
    ) -> Result<()> {
        let open = self.require_open()?;
        let blob = snapshot.seal(&open.password)?;
        store.replace(
            &open.vault_id,
            RecordUpdate {
                encrypted_blob: Some(blob),
                ..RecordUpdate::default()
            },
        )?;
        open.snapshot = snapshot;
        info!(vault_id = %open.vault_id, "vault saved");
        Ok(())
    }

    /// Save the edits of a working copy.
    pub fn save_working<P: StatePersistence>(
        &mut self,
        store: &mut VaultStore<P>,
        working: WorkingCopy,
    ) -> Result<()> {
        self.save(store, working.into_snapshot())
    }

    /// Re-encrypt the current vault under a new password.
    ///
    /// `old` must decrypt the vault (ignored for password-less vaults).
    /// An empty `new` removes the password: the blob is encrypted with
    /// the built-in default and the record is flagged password-less.
    pub fn change_password<P: StatePersistence>(
        &mut self,
        store: &mut VaultStore<P>,
        old: Option<&str>,
        new: &str,
    ) -> Result<()> {
        let record = store.current()?;
        let vault_id = record.id.clone();
        let old_effective = record
            .effective_password(old)
            .ok_or(PassordrError::PasswordExpired)?;

        let plaintext = decrypt(&record.encrypted_blob, old_effective)?;

        let has_password = !new.is_empty();
        let new_effective = if has_password { new } else { DEFAULT_PASSWORD };
        let blob = encrypt(&plaintext, new_effective)?;

        store.replace(&vault_id, RecordUpdate::content(has_password, blob))?;

        self.tick();
        if let Some(open) = self.open.as_mut().filter(|o| o.vault_id == vault_id) {
            open.password = Zeroizing::new(new_effective.to_string());
            open.has_password = has_password;
        }
        if self.state == LockState::Unlocked {
            let _ = self.keep_alive();
        }
        info!(vault_id = %vault_id, has_password, "vault password changed");
        Ok(())
    }
}
