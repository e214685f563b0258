//! In-memory edit buffer for an unlocked vault.
//!
//! `WorkingCopy` holds the last saved snapshot plus the edited hint and
//! services.  The edited list always ends with one empty placeholder row
//! that stands for "the next service to add"; naming it appends a new
//! placeholder.  Nothing is persisted until `into_snapshot` is handed to
//! the session manager.

use super::history::diff;
use super::snapshot::{HistoryEntry, Service, VaultSnapshot};
use crate::errors::{PassordrError, Result};

#[derive(Debug, Clone)]
pub struct WorkingCopy {
    saved: VaultSnapshot,
    hint: String,
    services: Vec<Service>,
}

impl WorkingCopy {
    /// Start editing `saved`.
    pub fn new(saved: VaultSnapshot) -> Self {
        let hint = saved.hint.clone();
        let mut services = saved.services.clone();
        services.push(Service::default());
        Self {
            saved,
            hint,
            services,
        }
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// Edited services, including the trailing placeholder.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn saved(&self) -> &VaultSnapshot {
        &self.saved
    }

    pub fn set_hint(&mut self, hint: impl Into<String>) {
        self.hint = hint.into();
    }

    /// Rename the service at `index`.
    ///
    /// Writing into the placeholder turns it into a real row and appends
    /// a fresh placeholder.
    pub fn set_service_name(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        let last = self.services.len() - 1;
        let service = self
            .services
            .get_mut(index)
            .ok_or(PassordrError::InvalidServiceIndex(index))?;
        service.name = name.into();

        if index == last && !service.name.is_empty() {
            self.services.push(Service::default());
        }
        Ok(())
    }

    /// Name the placeholder row.  Returns the index it was given.
    pub fn add_service(&mut self, name: impl Into<String>) -> usize {
        let index = self.services.len() - 1;
        self.services[index].name = name.into();
        self.services.push(Service::default());
        index
    }

    /// Flip the outdated flag of a saved service.
    ///
    /// Rows that were not part of the last save cannot be outdated.
    pub fn toggle_outdated(&mut self, index: usize) -> Result<()> {
        if index >= self.saved.services.len() {
            return Err(PassordrError::InvalidServiceIndex(index));
        }
        let service = &mut self.services[index];
        service.outdated = !service.outdated;
        Ok(())
    }

    /// Drop a new, still empty row that is not the placeholder.
    pub fn remove_pending(&mut self, index: usize) -> Result<()> {
        let is_new = index >= self.saved.services.len();
        let is_placeholder = index + 1 >= self.services.len();
        let is_empty = self
            .services
            .get(index)
            .is_some_and(|s| s.name.is_empty());

        if !is_new || is_placeholder || !is_empty {
            return Err(PassordrError::InvalidServiceIndex(index));
        }
        self.services.remove(index);
        Ok(())
    }

    fn as_snapshot(&self) -> VaultSnapshot {
        VaultSnapshot {
            hint: self.hint.clone(),
            services: self.services.clone(),
            history: Vec::new(),
        }
    }

    /// The history entry a save would record right now.
    pub fn pending_history(&self) -> HistoryEntry {
        diff(&self.saved, &self.as_snapshot())
    }

    /// `true` if saving would change anything.
    pub fn is_dirty(&self) -> bool {
        !self.pending_history().is_empty()
    }

    /// Merge the edits into a snapshot ready to be saved.
    ///
    /// The diff is appended to history unless it is a no-op, and new
    /// rows without a name (the placeholder included) are dropped.
    pub fn into_snapshot(self) -> VaultSnapshot {
        let entry = self.pending_history();
        let WorkingCopy {
            saved,
            hint,
            mut services,
        } = self;

        // New rows that never got a name are not services.
        let saved_len = saved.services.len();
        let mut index = 0;
        services.retain(|s| {
            let keep = index < saved_len || !s.name.is_empty();
            index += 1;
            keep
        });

        let mut history = saved.history;
        if !entry.is_empty() {
            history.push(entry);
        }

        VaultSnapshot {
            hint,
            services,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::snapshot::UpdateType;

    fn saved() -> VaultSnapshot {
        VaultSnapshot {
            hint: "hint".into(),
            services: vec![Service::new("mail"), Service::new("bank")],
            history: Vec::new(),
        }
    }

    #[test]
    fn starts_with_placeholder() {
        let wc = WorkingCopy::new(saved());
        assert_eq!(wc.services().len(), 3);
        assert_eq!(wc.services()[2], Service::default());
        assert!(!wc.is_dirty());
    }

    #[test]
    fn naming_placeholder_appends_new_one() {
        let mut wc = WorkingCopy::new(saved());
        wc.set_service_name(2, "forum").unwrap();
        assert_eq!(wc.services().len(), 4);
        assert_eq!(wc.services()[3].name, "");
    }

    #[test]
    fn cannot_outdate_new_rows() {
        let mut wc = WorkingCopy::new(saved());
        let idx = wc.add_service("forum");
        assert!(wc.toggle_outdated(idx).is_err());
        assert!(wc.toggle_outdated(0).is_ok());
    }

    #[test]
    fn remove_pending_only_for_empty_new_rows() {
        let mut wc = WorkingCopy::new(saved());
        wc.add_service("forum");
        wc.set_service_name(2, "").unwrap();
        // saved row
        assert!(wc.remove_pending(0).is_err());
        // placeholder
        assert!(wc.remove_pending(3).is_err());
        wc.remove_pending(2).unwrap();
        assert_eq!(wc.services().len(), 3);
    }

    #[test]
    fn into_snapshot_appends_history_and_strips_placeholder() {
        let mut wc = WorkingCopy::new(saved());
        wc.set_hint("new hint");
        wc.toggle_outdated(1).unwrap();
        wc.add_service("forum");

        let snap = wc.into_snapshot();
        assert_eq!(snap.hint, "new hint");
        assert_eq!(snap.services.len(), 3);
        assert!(snap.services[1].outdated);
        assert_eq!(snap.history.len(), 1);

        let kinds: Vec<_> = snap.history[0].updates.iter().map(|u| u.kind).collect();
        assert_eq!(kinds, vec![UpdateType::Outdate, UpdateType::Added]);
    }

    #[test]
    fn unchanged_save_adds_no_history() {
        let snap = WorkingCopy::new(saved()).into_snapshot();
        assert_eq!(snap, saved());
    }

    #[test]
    fn clearing_the_placeholder_does_not_add_a_row() {
        let mut wc = WorkingCopy::new(VaultSnapshot {
            services: vec![Service::new("A")],
            ..VaultSnapshot::default()
        });
        wc.set_service_name(1, "").unwrap();
        assert_eq!(wc.services().len(), 2);
        assert!(!wc.is_dirty());

        let snap = wc.into_snapshot();
        assert_eq!(snap.services, vec![Service::new("A")]);
        assert!(snap.history.is_empty());
    }

    #[test]
    fn emptied_new_rows_are_never_saved() {
        let mut wc = WorkingCopy::new(VaultSnapshot {
            services: vec![Service::new("A")],
            ..VaultSnapshot::default()
        });
        wc.add_service("draft");
        wc.set_service_name(1, "").unwrap();
        wc.add_service("forum");

        let snap = wc.into_snapshot();
        assert_eq!(snap.services, vec![Service::new("A"), Service::new("forum")]);
        let updates = &snap.history[0].updates;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].service_name_to, "forum");
    }
}
