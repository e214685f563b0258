//! `passordr show` — unlock the current vault and print it.

use crate::cli::output;
use crate::cli::{unlock, Cli, Context};
use crate::errors::Result;

/// Execute the `show` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = ctx.session();
    let snapshot = unlock(&ctx, &mut session)?;

    let record = ctx.store.current()?;
    output::print_snapshot(&record.name, &snapshot);

    if let Some(when) = snapshot.last_change() {
        output::tip(&format!(
            "Last change {} ({} history entries)",
            when.format("%Y-%m-%d %H:%M"),
            snapshot.history.len()
        ));
    }

    // Nothing stays decrypted once the command returns.
    session.force_lock();
    Ok(())
}
