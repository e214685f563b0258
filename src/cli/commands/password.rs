//! `passordr password` — set, change or remove the current vault's password.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{prompt_new_password, prompt_password, Cli, Context};
use crate::errors::Result;

/// Execute the `password` command.
pub fn execute(cli: &Cli, remove: bool) -> Result<()> {
    let mut ctx = Context::load(cli)?;
    let record = ctx.store.current()?;
    let name = record.name.clone();
    let had_password = record.has_password;

    if remove && !had_password {
        output::info(&format!("Vault '{name}' has no password."));
        return Ok(());
    }

    let old = if had_password {
        Some(prompt_password()?)
    } else {
        None
    };
    let new = if remove {
        Zeroizing::new(String::new())
    } else {
        prompt_new_password()?
    };

    let mut session = ctx.session();
    session.change_password(
        &mut ctx.store,
        old.as_deref().map(String::as_str),
        new.as_str(),
    )?;
    session.force_lock();

    match (had_password, remove) {
        (_, true) => {
            output::success(&format!("Password removed from vault '{name}'"));
            output::warning("Anyone with access to the state file can now read this vault.");
        }
        (true, false) => output::success(&format!("Password of vault '{name}' changed")),
        (false, false) => output::success(&format!("Vault '{name}' is now password-protected")),
    }

    output::tip("Older backups still open with the password they were made with.");
    Ok(())
}
