//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{PassordrError, Result};
use crate::session::SessionManager;
use crate::sync::{CloudSynchronizer, LocalFileSynchronizer, Synchronizer, SynchronizerKind};
use crate::vault::{StatePersistence, VaultSnapshot, VaultStore};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// passordr CLI: encrypted vaults of service names and password hints.
#[derive(Parser)]
#[command(
    name = "passordr",
    about = "Encrypted vaults of service names and password hints",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the vault state, config and backups
    #[arg(long, env = "PASSORDR_DIR", default_value = ".passordr", global = true)]
    pub data_dir: String,

    /// Print debug diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Manage vaults (list, create, select, rename, delete)
    Vault {
        #[command(subcommand)]
        action: VaultAction,
    },

    /// Unlock the current vault and print its hint and services
    Show,

    /// Replace the hint of the current vault
    Hint {
        /// New hint text
        text: String,
    },

    /// Append services to the current vault
    Add {
        /// Service names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Rename a service
    RenameService {
        /// Service index (as shown by `show`)
        index: usize,
        /// New service name
        name: String,
    },

    /// Toggle the outdated flag of a service
    Outdate {
        /// Service index (as shown by `show`)
        index: usize,
    },

    /// Show the change history of the current vault
    History {
        /// Only show the most recent entries
        #[arg(long)]
        last: Option<usize>,
    },

    /// Set, change or remove the current vault's password
    Password {
        /// Remove the password (the vault opens without one)
        #[arg(long)]
        remove: bool,
    },

    /// Back up the current vault's encrypted record
    Backup {
        /// Backend to use (defaults to `sync_backend` from passordr.toml)
        #[arg(short, long, value_parser = parse_backend)]
        backend: Option<SynchronizerKind>,
    },

    /// Replace the current vault with a backup
    Restore {
        /// Backup file path (local-file) or object id (cloud)
        backup_id: Option<String>,

        /// Backend to use (defaults to `sync_backend` from passordr.toml)
        #[arg(short, long, value_parser = parse_backend)]
        backend: Option<SynchronizerKind>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Manage cloud backups (list, delete)
    Backups {
        #[command(subcommand)]
        action: BackupsAction,
    },

    /// Show or set the inactivity auto-lock delay in milliseconds (0 = never)
    LockTimeout {
        /// New delay in milliseconds
        ms: Option<u64>,
    },

    /// Show the effective configuration and data paths
    Config,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Vault subcommands.
#[derive(clap::Subcommand)]
pub enum VaultAction {
    /// List all vaults
    List,

    /// Create a new vault
    Create {
        /// Vault name
        #[arg(default_value = crate::vault::DEFAULT_VAULT_NAME)]
        name: String,
        /// Make the new vault the current one
        #[arg(long)]
        select: bool,
    },

    /// Make a vault the current one
    Select {
        /// Vault id or name
        vault: String,
    },

    /// Rename a vault
    Rename {
        /// Vault id or name
        vault: String,
        /// New name
        name: String,
    },

    /// Delete a vault
    Delete {
        /// Vault id or name
        vault: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Cloud backup subcommands.
#[derive(clap::Subcommand)]
pub enum BackupsAction {
    /// List cloud backups
    List,

    /// Delete cloud backups
    Delete {
        /// Object ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn parse_backend(value: &str) -> std::result::Result<SynchronizerKind, String> {
    match value.to_lowercase().as_str() {
        "local-file" | "local" | "file" => Ok(SynchronizerKind::LocalFile),
        "cloud" | "drive" | "google-drive" => Ok(SynchronizerKind::Cloud),
        other => Err(format!("unknown backend '{other}' — use local-file or cloud")),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Everything a command needs: where data lives, settings, and the store.
pub struct Context {
    pub data_dir: PathBuf,
    pub settings: Settings,
    pub store: VaultStore<Box<dyn StatePersistence>>,
}

impl Context {
    /// Resolve the data dir, load settings and open the vault store.
    pub fn load(cli: &Cli) -> Result<Self> {
        let data_dir = PathBuf::from(&cli.data_dir);
        let settings = Settings::load(&data_dir)?;
        let store = VaultStore::open(settings.persistence(&data_dir)?)?;
        Ok(Self {
            data_dir,
            settings,
            store,
        })
    }

    /// A session manager using the stored auto-lock delay.
    pub fn session(&self) -> SessionManager {
        SessionManager::new(self.store.password_validity())
    }

    /// Find a vault by id, or by name when the name is unique.
    pub fn resolve_vault(&self, reference: &str) -> Result<String> {
        if let Ok(record) = self.store.get(reference) {
            return Ok(record.id.clone());
        }

        let matches: Vec<_> = self
            .store
            .list()
            .iter()
            .filter(|v| v.name == reference)
            .collect();

        match matches.as_slice() {
            [only] => Ok(only.id.clone()),
            [] => Err(PassordrError::VaultNotFound(reference.to_string())),
            _ => Err(PassordrError::CommandFailed(format!(
                "several vaults are named '{reference}' — use the vault id"
            ))),
        }
    }

    /// The backend to use for `backup` / `restore`.
    pub fn synchronizer(&self, kind: Option<SynchronizerKind>) -> Result<Box<dyn Synchronizer>> {
        match kind.unwrap_or(self.settings.sync_backend) {
            SynchronizerKind::LocalFile => Ok(Box::new(LocalFileSynchronizer::new(
                self.settings.backup_path(&self.data_dir),
            ))),
            SynchronizerKind::Cloud => Ok(Box::new(self.cloud()?)),
        }
    }

    /// The cloud backend, authenticated with the configured token.
    #[cfg(feature = "google-drive")]
    pub fn cloud(&self) -> Result<CloudSynchronizer<crate::sync::DriveStorage>> {
        let token = self.settings.drive_token().ok_or_else(|| {
            PassordrError::ConfigError(format!(
                "no cloud access token — set {}",
                self.settings.drive_token_env
            ))
        })?;
        Ok(CloudSynchronizer::new(crate::sync::DriveStorage::new(token)))
    }

    #[cfg(not(feature = "google-drive"))]
    pub fn cloud(&self) -> Result<CloudSynchronizer<crate::sync::MemoryCloudStorage>> {
        Err(PassordrError::ConfigError(
            "cloud backups need a build with the `google-drive` feature".into(),
        ))
    }
}

/// Open the current vault, prompting for its password if it has one.
pub fn unlock(ctx: &Context, session: &mut SessionManager) -> Result<VaultSnapshot> {
    let record = ctx.store.current()?;
    let password = if record.has_password {
        Some(prompt_password()?)
    } else {
        None
    };
    let snapshot = session.open(&ctx.store, password.as_deref().map(String::as_str))?;
    Ok(snapshot.clone())
}

/// Get the vault password, trying in order:
/// 1. `PASSORDR_PASSWORD` env var (scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("PASSORDR_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault password")
        .interact()
        .map_err(|e| PassordrError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation.
///
/// Respects `PASSORDR_NEW_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("PASSORDR_NEW_PASSWORD") {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(PassordrError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose vault password")
            .with_confirmation(
                "Confirm vault password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| PassordrError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Ask a yes/no question, defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| PassordrError::CommandFailed(format!("confirm prompt: {e}")))
}
