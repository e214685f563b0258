use thiserror::Error;

/// All errors that can occur in passordr.
#[derive(Debug, Error)]
pub enum PassordrError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authentication-tag failure, bad base64 or truncated blob.
    /// Deliberately a single variant so callers cannot tell them apart.
    #[error("Wrong password or corrupted vault data")]
    BadPassword,

    // --- Session errors ---
    #[error("Vault is locked — enter the password to open it again")]
    PasswordExpired,

    // --- Vault errors ---
    #[error("Vault '{0}' not found")]
    VaultNotFound(String),

    #[error("Cannot delete the last remaining vault")]
    LastVaultDeletion,

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("No service at index {0}")]
    InvalidServiceIndex(usize),

    #[error("Unsupported state version {found} (this build reads up to {supported})")]
    UnsupportedStateVersion { found: u32, supported: u32 },

    // --- Backup errors ---
    #[error("Malformed backup: {0}")]
    MalformedBackup(String),

    #[error("This backend needs a backup id to restore from")]
    MissingBackupId,

    #[error("Network error: {0}")]
    Network(String),

    // --- Storage errors ---
    #[error("State storage error: {0}")]
    StorageError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for passordr results.
pub type Result<T> = std::result::Result<T, PassordrError>;
