//! Persistence ports for the vault state document.
//!
//! The store never touches the filesystem directly; it is handed a
//! `StatePersistence` that knows how to load and save one
//! `PersistedState`.  Three ports are provided:
//!
//! - `JsonFilePersistence`: a single JSON file, written atomically.
//! - `MemoryPersistence`: shared in-memory slot, for tests and embedding.
//! - `SqlitePersistence` (feature `sqlite-store`): a key-value table.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::record::{PersistedState, STATE_VERSION};
use crate::errors::{PassordrError, Result};

/// Key under which the state document is stored in key-value backends.
pub const STATE_KEY: &str = "passordrVaults";

/// Load/save port for the state document.
pub trait StatePersistence {
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<PersistedState>>;

    fn save(&self, state: &PersistedState) -> Result<()>;
}

impl<T: StatePersistence + ?Sized> StatePersistence for Box<T> {
    fn load(&self) -> Result<Option<PersistedState>> {
        (**self).load()
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        (**self).save(state)
    }
}

/// Parse a state document and reject versions newer than this build.
pub fn decode_state(bytes: &[u8]) -> Result<PersistedState> {
    let state: PersistedState = serde_json::from_slice(bytes)
        .map_err(|e| PassordrError::StorageError(format!("state JSON: {e}")))?;

    if state.version > STATE_VERSION {
        return Err(PassordrError::UnsupportedStateVersion {
            found: state.version,
            supported: STATE_VERSION,
        });
    }
    Ok(state)
}

fn encode_state(state: &PersistedState) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(state)
        .map_err(|e| PassordrError::SerializationError(format!("state: {e}")))
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// Stores the state as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatePersistence for JsonFilePersistence {
    fn load(&self) -> Result<Option<PersistedState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read(&self.path)?;
        decode_state(&data).map(Some)
    }

    /// Write to a temp file in the same directory, then rename over the
    /// target so readers never see a half-written document.
    fn save(&self, state: &PersistedState) -> Result<()> {
        let buf = encode_state(state)?;

        let parent = self.path.parent().unwrap_or(Path::new("."));
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        ));

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp_path)?;

        // `mode` only applies on creation; a leftover temp file keeps its own.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(&buf)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In memory
// ---------------------------------------------------------------------------

/// Shared in-memory slot.  Clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    slot: Arc<Mutex<Option<PersistedState>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// What was saved last, if anything.
    pub fn snapshot(&self) -> Option<PersistedState> {
        self.slot.lock().ok().and_then(|s| s.clone())
    }
}

impl StatePersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<PersistedState>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| PassordrError::StorageError("memory slot poisoned".into()))?;
        Ok(slot.clone())
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| PassordrError::StorageError("memory slot poisoned".into()))?;
        *slot = Some(state.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SQLite key-value table
// ---------------------------------------------------------------------------

#[cfg(feature = "sqlite-store")]
pub use sqlite::SqlitePersistence;

#[cfg(feature = "sqlite-store")]
mod sqlite {
    use std::path::Path;

    use rusqlite::{Connection, OptionalExtension};

    use super::{decode_state, encode_state, StatePersistence, STATE_KEY};
    use crate::errors::{PassordrError, Result};
    use crate::vault::record::PersistedState;

    /// Stores the state document in a `kv` table of a SQLite database.
    pub struct SqlitePersistence {
        conn: Connection,
    }

    impl SqlitePersistence {
        /// Open (or create) the database at `path`.
        pub fn open(path: &Path) -> Result<Self> {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let conn = Connection::open(path)
                .map_err(|e| PassordrError::StorageError(format!("open {}: {e}", path.display())))?;

            // The file exists once the table has been created.
            let store = Self::with_connection(conn)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = std::fs::Permissions::from_mode(0o600);
                std::fs::set_permissions(path, perms)?;
            }

            Ok(store)
        }

        /// In-memory database, mostly for tests.
        pub fn open_in_memory() -> Result<Self> {
            let conn = Connection::open_in_memory()
                .map_err(|e| PassordrError::StorageError(format!("open in-memory: {e}")))?;
            Self::with_connection(conn)
        }

        fn with_connection(conn: Connection) -> Result<Self> {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| PassordrError::StorageError(format!("create table: {e}")))?;
            Ok(Self { conn })
        }
    }

    impl StatePersistence for SqlitePersistence {
        fn load(&self) -> Result<Option<PersistedState>> {
            let value: Option<String> = self
                .conn
                .query_row(
                    "SELECT value FROM kv WHERE key = ?1",
                    rusqlite::params![STATE_KEY],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| PassordrError::StorageError(format!("load: {e}")))?;

            value.map(|v| decode_state(v.as_bytes())).transpose()
        }

        fn save(&self, state: &PersistedState) -> Result<()> {
            let bytes = encode_state(state)?;
            let value = String::from_utf8(bytes)
                .map_err(|e| PassordrError::SerializationError(format!("state: {e}")))?;
            self.conn
                .execute(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    rusqlite::params![STATE_KEY, value],
                )
                .map_err(|e| PassordrError::StorageError(format!("save: {e}")))?;
            Ok(())
        }
    }
}
