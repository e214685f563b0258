//! Decrypted vault content: the hint, the service list and its history.
//!
//! A `VaultSnapshot` only ever exists in memory.  On disk it is the
//! JSON encoding of this struct, encrypted into a record's blob.  Field
//! names are a stable format shared with other passordr clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{decrypt, encrypt};
use crate::errors::{PassordrError, Result};

/// A single service line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub outdated: bool,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outdated: false,
        }
    }
}

/// What happened to one service between two saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    Added,
    Update,
    Outdate,
}

/// One service change inside a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdate {
    pub service_index: usize,
    #[serde(rename = "type")]
    pub kind: UpdateType,
    pub service_name_from: String,
    pub service_name_to: String,
}

/// Hint text before and after a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintChange {
    pub hint_from: String,
    pub hint_to: String,
}

/// Everything that changed in one save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<HintChange>,

    #[serde(default)]
    pub updates: Vec<ServiceUpdate>,
}

impl HistoryEntry {
    /// `true` when the save changed nothing.
    pub fn is_empty(&self) -> bool {
        self.hint.is_none() && self.updates.is_empty()
    }
}

/// The decrypted payload of a vault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    #[serde(default)]
    pub hint: String,

    #[serde(default)]
    pub services: Vec<Service>,

    /// Oldest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl VaultSnapshot {
    /// Serialize and encrypt this snapshot under `password`.
    pub fn seal(&self, password: &str) -> Result<String> {
        let json = Zeroizing::new(
            serde_json::to_vec(self)
                .map_err(|e| PassordrError::SerializationError(format!("snapshot: {e}")))?,
        );
        encrypt(&json, password)
    }

    /// Decrypt and parse a record blob.
    ///
    /// A blob that authenticates but does not hold a snapshot is
    /// reported as `InvalidVaultFormat`, never as a wrong password.
    pub fn unseal(blob: &str, password: &str) -> Result<Self> {
        let plaintext = decrypt(blob, password)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| PassordrError::InvalidVaultFormat(format!("snapshot JSON: {e}")))
    }

    /// Timestamp of the latest save recorded in history, if any.
    pub fn last_change(&self) -> Option<DateTime<Utc>> {
        self.history.last().map(|h| h.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_field_names() {
        let snapshot = VaultSnapshot {
            hint: "h".into(),
            services: vec![Service::new("mail")],
            history: vec![HistoryEntry {
                timestamp: Utc::now(),
                hint: Some(HintChange {
                    hint_from: String::new(),
                    hint_to: "h".into(),
                }),
                updates: vec![ServiceUpdate {
                    service_index: 0,
                    kind: UpdateType::Added,
                    service_name_from: String::new(),
                    service_name_to: "mail".into(),
                }],
            }],
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        let update = &json["history"][0]["updates"][0];
        assert_eq!(update["serviceIndex"], 0);
        assert_eq!(update["type"], "added");
        assert_eq!(update["serviceNameTo"], "mail");
        assert_eq!(json["history"][0]["hint"]["hintTo"], "h");
        assert_eq!(json["services"][0]["outdated"], false);
    }

    #[test]
    fn parses_entry_without_hint_change() {
        let json = r#"{"timestamp":"2023-04-01T10:00:00.000Z","updates":[]}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert!(entry.is_empty());
    }

    #[test]
    fn seal_then_unseal() {
        let snapshot = VaultSnapshot {
            hint: "first pet + year".into(),
            services: vec![Service::new("bank"), Service::new("forum")],
            history: Vec::new(),
        };
        let blob = snapshot.seal("correct horse").unwrap();
        assert_eq!(VaultSnapshot::unseal(&blob, "correct horse").unwrap(), snapshot);
    }

    #[test]
    fn non_snapshot_plaintext_is_format_error() {
        let blob = encrypt(b"not json", "pw").unwrap();
        assert!(matches!(
            VaultSnapshot::unseal(&blob, "pw"),
            Err(PassordrError::InvalidVaultFormat(_))
        ));
    }
}
