//! `passordr vault` — list, create, select, rename and delete vaults.

use crate::cli::output;
use crate::cli::{confirm, Cli, Context, VaultAction};
use crate::errors::Result;

/// Execute a `vault` subcommand.
pub fn execute(cli: &Cli, action: &VaultAction) -> Result<()> {
    let mut ctx = Context::load(cli)?;

    match action {
        VaultAction::List => list(&ctx),
        VaultAction::Create { name, select } => create(&mut ctx, name, *select),
        VaultAction::Select { vault } => select(&mut ctx, vault),
        VaultAction::Rename { vault, name } => rename(&mut ctx, vault, name),
        VaultAction::Delete { vault, force } => delete(&mut ctx, vault, *force),
    }
}

fn list(ctx: &Context) -> Result<()> {
    let vaults = ctx.store.list();
    output::info(&format!("{} vault(s)", vaults.len()));
    output::print_vaults_table(vaults, ctx.store.current_id());
    Ok(())
}

fn create(ctx: &mut Context, name: &str, select: bool) -> Result<()> {
    let record = if select {
        let mut session = ctx.session();
        let record = ctx.store.create(name)?;
        session.select_vault(&mut ctx.store, &record.id)?;
        record
    } else {
        ctx.store.create(name)?
    };

    output::success(&format!("Created vault '{}' ({})", record.name, record.id));
    if select {
        output::info("It is now the current vault.");
    } else {
        output::tip(&format!("Switch to it: passordr vault select {}", record.id));
    }
    output::tip("Protect it: passordr password");
    Ok(())
}

fn select(ctx: &mut Context, reference: &str) -> Result<()> {
    let id = ctx.resolve_vault(reference)?;
    let mut session = ctx.session();
    session.select_vault(&mut ctx.store, &id)?;

    let record = ctx.store.current()?;
    output::success(&format!("Current vault is now '{}'", record.name));
    Ok(())
}

fn rename(ctx: &mut Context, reference: &str, name: &str) -> Result<()> {
    let id = ctx.resolve_vault(reference)?;
    let old = ctx.store.get(&id)?.name.clone();
    ctx.store.rename(&id, name)?;

    let new = &ctx.store.get(&id)?.name;
    output::success(&format!("Renamed vault '{old}' to '{new}'"));
    Ok(())
}

fn delete(ctx: &mut Context, reference: &str, force: bool) -> Result<()> {
    let id = ctx.resolve_vault(reference)?;
    let name = ctx.store.get(&id)?.name.clone();

    if !force && !confirm(&format!("Delete vault '{name}'? This cannot be undone"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    let mut session = ctx.session();
    ctx.store.delete(&id)?;
    session.forget_vault(&id);

    output::success(&format!("Deleted vault '{name}'"));
    let current = ctx.store.current()?;
    output::info(&format!("Current vault: '{}'", current.name));
    Ok(())
}
