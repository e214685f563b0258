//! `passordr lock-timeout` — show or set the inactivity auto-lock delay.

use std::time::Duration;

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;

/// Execute the `lock-timeout` command.
pub fn execute(cli: &Cli, ms: Option<u64>) -> Result<()> {
    let mut ctx = Context::load(cli)?;

    match ms {
        None => {
            output::info(&describe(ctx.store.password_validity()));
        }
        Some(ms) => {
            ctx.store.set_password_validity(Duration::from_millis(ms))?;
            output::success(&describe(ctx.store.password_validity()));
        }
    }
    Ok(())
}

fn describe(validity: Duration) -> String {
    if validity.is_zero() {
        "Auto-lock is disabled".to_string()
    } else {
        format!(
            "Vaults lock after {} ms of inactivity",
            validity.as_millis()
        )
    }
}
