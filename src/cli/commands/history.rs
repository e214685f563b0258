//! `passordr history` — print the change log of the current vault.

use crate::cli::output;
use crate::cli::{unlock, Cli, Context};
use crate::errors::Result;

/// Execute the `history` command.
pub fn execute(cli: &Cli, last: Option<usize>) -> Result<()> {
    let ctx = Context::load(cli)?;
    let mut session = ctx.session();
    let snapshot = unlock(&ctx, &mut session)?;
    session.force_lock();

    let entries = &snapshot.history;
    let shown = match last {
        Some(n) if n < entries.len() => &entries[entries.len() - n..],
        _ => &entries[..],
    };

    output::print_history(shown);
    if shown.len() < entries.len() {
        output::tip(&format!(
            "Showing {} of {} entries. Drop --last to see all.",
            shown.len(),
            entries.len()
        ));
    }
    Ok(())
}
