use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{PassordrError, Result};
use crate::sync::SynchronizerKind;
use crate::vault::{JsonFilePersistence, StatePersistence};

/// Where the vault state document is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    Json,
    Sqlite,
}

/// Installation-level configuration, loaded from `passordr.toml`.
///
/// Every field has a sensible default so passordr works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Storage used for the vault state document.
    #[serde(default = "default_state_backend")]
    pub state_backend: StateBackend,

    /// File name (relative to the data dir) of the state document.
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Directory (relative to the data dir) for local-file backups.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    /// Backend used by `backup` / `restore` when none is given.
    #[serde(default = "default_sync_backend")]
    pub sync_backend: SynchronizerKind,

    /// Environment variable holding the cloud provider's access token.
    #[serde(default = "default_drive_token_env")]
    pub drive_token_env: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_state_backend() -> StateBackend {
    StateBackend::Json
}

fn default_state_file() -> String {
    "vaults.json".to_string()
}

fn default_backup_dir() -> String {
    "backups".to_string()
}

fn default_sync_backend() -> SynchronizerKind {
    SynchronizerKind::LocalFile
}

fn default_drive_token_env() -> String {
    "PASSORDR_DRIVE_TOKEN".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_backend: default_state_backend(),
            state_file: default_state_file(),
            backup_dir: default_backup_dir(),
            sync_backend: default_sync_backend(),
            drive_token_env: default_drive_token_env(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the data directory.
    pub const FILE_NAME: &'static str = "passordr.toml";

    /// Load settings from `<data_dir>/passordr.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PassordrError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path of the state document.
    pub fn state_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.state_file)
    }

    /// Full path of the local-file backup directory.
    pub fn backup_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.backup_dir)
    }

    /// Build the persistence port selected by `state_backend`.
    pub fn persistence(&self, data_dir: &Path) -> Result<Box<dyn StatePersistence>> {
        let path = self.state_path(data_dir);
        match self.state_backend {
            StateBackend::Json => Ok(Box::new(JsonFilePersistence::new(path))),
            #[cfg(feature = "sqlite-store")]
            StateBackend::Sqlite => Ok(Box::new(crate::vault::SqlitePersistence::open(&path)?)),
            #[cfg(not(feature = "sqlite-store"))]
            StateBackend::Sqlite => Err(PassordrError::ConfigError(
                "state_backend = \"sqlite\" needs the `sqlite-store` feature".into(),
            )),
        }
    }

    /// Cloud access token from the configured environment variable.
    pub fn drive_token(&self) -> Option<String> {
        std::env::var(&self.drive_token_env)
            .ok()
            .filter(|t| !t.is_empty())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
