//! Local-file backups: one `<vault id>.json` per vault in a directory.

use std::fs;
use std::path::PathBuf;

use super::{BackupPayload, Synchronizer, SynchronizerKind};
use crate::errors::Result;
use crate::vault::{BackupMetadata, VaultRecord};

#[derive(Debug, Clone)]
pub struct LocalFileSynchronizer {
    dir: PathBuf,
}

impl LocalFileSynchronizer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where `vault` is written by `backup`.
    pub fn backup_path(&self, vault: &VaultRecord) -> PathBuf {
        self.dir.join(format!("{}.json", vault.id))
    }
}

impl Synchronizer for LocalFileSynchronizer {
    fn kind(&self) -> SynchronizerKind {
        SynchronizerKind::LocalFile
    }

    fn backup(&self, vault: &VaultRecord) -> Result<BackupMetadata> {
        fs::create_dir_all(&self.dir)?;
        let json = BackupPayload::from_record(vault).to_json()?;
        fs::write(self.backup_path(vault), json)?;
        Ok(BackupMetadata::now())
    }

    /// Read the file at `backup_id` (a path), or this vault's default
    /// backup file when no path is given.
    fn restore(&self, backup_id: Option<&str>, vault: &VaultRecord) -> Result<BackupPayload> {
        let path = match backup_id {
            Some(path) => PathBuf::from(path),
            None => self.backup_path(vault),
        };
        let data = fs::read(&path)?;
        BackupPayload::parse(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PassordrError;
    use tempfile::TempDir;

    #[test]
    fn backup_writes_named_file() {
        let tmp = TempDir::new().unwrap();
        let sync = LocalFileSynchronizer::new(tmp.path().join("backups"));
        let vault = VaultRecord::generate("v").unwrap();

        sync.backup(&vault).unwrap();
        let written = fs::read_to_string(tmp.path().join("backups").join(format!("{}.json", vault.id))).unwrap();
        assert!(written.contains("\"encryptedData\""));
        assert_eq!(sync.restore(None, &vault).unwrap(), BackupPayload::from_record(&vault));
    }

    #[test]
    fn restore_rejects_file_without_blob() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, r#"{"password": false}"#).unwrap();

        let sync = LocalFileSynchronizer::new(tmp.path());
        let vault = VaultRecord::generate("v").unwrap();
        assert!(matches!(
            sync.restore(path.to_str(), &vault),
            Err(PassordrError::MalformedBackup(_))
        ));
    }
}
