//! Semantic diff between the last saved snapshot and a working copy.
//!
//! The working copy's service list may end with one empty "pending
//! new entry" row.  New rows, that one included, are only recorded
//! once they have a name.

use chrono::Utc;

use super::snapshot::{HintChange, HistoryEntry, Service, ServiceUpdate, UpdateType, VaultSnapshot};

/// Classify a single working row against its saved counterpart.
///
/// A new row only counts once it has a name.
fn classify(saved: Option<&Service>, working: &Service) -> Option<UpdateType> {
    match saved {
        Some(saved) => {
            if saved.outdated && !working.outdated {
                Some(UpdateType::Added)
            } else if !saved.outdated && working.outdated {
                Some(UpdateType::Outdate)
            } else if saved.name != working.name {
                Some(UpdateType::Update)
            } else {
                None
            }
        }
        None => (!working.name.is_empty()).then_some(UpdateType::Added),
    }
}

/// Compute the history entry describing `working` relative to `saved`.
///
/// Returns an entry with no hint change and no updates when nothing
/// changed; see `HistoryEntry::is_empty`.
pub fn diff(saved: &VaultSnapshot, working: &VaultSnapshot) -> HistoryEntry {
    let hint = (saved.hint != working.hint).then(|| HintChange {
        hint_from: saved.hint.clone(),
        hint_to: working.hint.clone(),
    });

    let updates = working
        .services
        .iter()
        .enumerate()
        .filter_map(|(i, service)| {
            let before = saved.services.get(i);
            classify(before, service).map(|kind| ServiceUpdate {
                service_index: i,
                kind,
                service_name_from: before.map(|s| s.name.clone()).unwrap_or_default(),
                service_name_to: service.name.clone(),
            })
        })
        .collect();

    HistoryEntry {
        timestamp: Utc::now(),
        hint,
        updates,
    }
}
