//! Editing commands: `hint`, `add`, `rename-service` and `outdate`.
//!
//! Each one unlocks the current vault, applies its change to a working
//! copy and saves it.  The history entry is computed at save time from
//! the difference with what was stored.

use crate::cli::output;
use crate::cli::{unlock, Cli, Context};
use crate::errors::{PassordrError, Result};
use crate::vault::{UpdateType, WorkingCopy};

/// Execute the `hint` command.
pub fn execute_hint(cli: &Cli, text: &str) -> Result<()> {
    edit(cli, |working| {
        working.set_hint(text);
        Ok(())
    })
}

/// Execute the `add` command.
pub fn execute_add(cli: &Cli, names: &[String]) -> Result<()> {
    if let Some(blank) = names.iter().position(|n| n.trim().is_empty()) {
        return Err(PassordrError::CommandFailed(format!(
            "service name #{} is empty",
            blank + 1
        )));
    }

    edit(cli, |working| {
        for name in names {
            working.add_service(name.trim());
        }
        Ok(())
    })
}

/// Execute the `rename-service` command.
pub fn execute_rename(cli: &Cli, index: usize, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PassordrError::CommandFailed(
            "service name cannot be empty".into(),
        ));
    }
    edit(cli, |working| {
        // The trailing placeholder is not a real service.
        if index + 1 >= working.services().len() {
            return Err(PassordrError::InvalidServiceIndex(index));
        }
        working.set_service_name(index, name.trim())
    })
}

/// Execute the `outdate` command.
pub fn execute_outdate(cli: &Cli, index: usize) -> Result<()> {
    edit(cli, |working| working.toggle_outdated(index))
}

fn edit<F>(cli: &Cli, apply: F) -> Result<()>
where
    F: FnOnce(&mut WorkingCopy) -> Result<()>,
{
    let mut ctx = Context::load(cli)?;
    let mut session = ctx.session();
    unlock(&ctx, &mut session)?;

    let mut working = session.edit()?;
    apply(&mut working)?;

    if !working.is_dirty() {
        output::info("Nothing changed.");
        session.force_lock();
        return Ok(());
    }

    let pending = working.pending_history();
    session.save_working(&mut ctx.store, working)?;
    session.force_lock();

    if let Some(hint) = &pending.hint {
        if hint.hint_to.is_empty() {
            output::success("Hint cleared");
        } else {
            output::success("Hint updated");
        }
    }
    for update in &pending.updates {
        let msg = match update.kind {
            UpdateType::Added if !update.service_name_from.is_empty() => format!(
                "Service #{} is current again: {}",
                update.service_index, update.service_name_to
            ),
            UpdateType::Added => format!(
                "Added service #{}: {}",
                update.service_index, update.service_name_to
            ),
            UpdateType::Update => format!(
                "Renamed service #{}: {} -> {}",
                update.service_index, update.service_name_from, update.service_name_to
            ),
            UpdateType::Outdate => format!(
                "Marked service #{} as outdated: {}",
                update.service_index, update.service_name_to
            ),
        };
        output::success(&msg);
    }
    Ok(())
}
