//! Backup commands: `backup`, `restore` and `backups`.

use crate::cli::output;
use crate::cli::{confirm, BackupsAction, Cli, Context};
use crate::errors::Result;
use crate::sync::{backup_vault, restore_vault, LocalFileSynchronizer, SynchronizerKind};

/// Execute the `backup` command.
pub fn execute_backup(cli: &Cli, backend: Option<SynchronizerKind>) -> Result<()> {
    let mut ctx = Context::load(cli)?;
    let sync = ctx.synchronizer(backend)?;
    let vault_id = ctx.store.current_id().to_string();

    let meta = backup_vault(&mut ctx.store, sync.as_ref(), &vault_id)?;

    let record = ctx.store.current()?;
    output::success(&format!(
        "Backed up vault '{}' to {} at {}",
        record.name,
        sync.kind(),
        meta.last_backup_date.format("%Y-%m-%d %H:%M:%S")
    ));
    if sync.kind() == SynchronizerKind::LocalFile {
        let path = LocalFileSynchronizer::new(ctx.settings.backup_path(&ctx.data_dir))
            .backup_path(record);
        output::info(&format!("Written to {}", path.display()));
    }
    Ok(())
}

/// Execute the `restore` command.
pub fn execute_restore(
    cli: &Cli,
    backup_id: Option<&str>,
    backend: Option<SynchronizerKind>,
    force: bool,
) -> Result<()> {
    let mut ctx = Context::load(cli)?;
    let sync = ctx.synchronizer(backend)?;
    let record = ctx.store.current()?;
    let vault_id = record.id.clone();
    let name = record.name.clone();

    if !force
        && !confirm(&format!(
            "Replace the content of vault '{name}' with the backup? Unsaved history is lost"
        ))?
    {
        output::info("Cancelled.");
        return Ok(());
    }

    let mut session = ctx.session();
    restore_vault(&mut ctx.store, &mut session, sync.as_ref(), backup_id, &vault_id)?;

    output::success(&format!("Restored vault '{name}' from {}", sync.kind()));
    if ctx.store.current()?.has_password {
        output::tip("Unlock it with the password it was backed up with.");
    }
    Ok(())
}

/// Execute a `backups` subcommand.
pub fn execute_backups(cli: &Cli, action: &BackupsAction) -> Result<()> {
    let ctx = Context::load(cli)?;
    let cloud = ctx.cloud()?;

    match action {
        BackupsAction::List => {
            let objects = cloud.list()?;
            output::print_backups_table(&objects);
        }
        BackupsAction::Delete { ids } => {
            cloud.delete_backups(ids)?;
            output::success(&format!("Deleted {} backup(s)", ids.len()));
        }
    }
    Ok(())
}
