//! `passordr config` — show the effective settings and where data lives.

use comfy_table::{ContentArrangement, Table};

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::config::{Settings, StateBackend};
use crate::errors::Result;

/// Execute the `config` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let settings = &ctx.settings;

    let config_path = ctx.data_dir.join(Settings::FILE_NAME);
    if config_path.exists() {
        output::info(&format!("Loaded {}", config_path.display()));
    } else {
        output::info(&format!(
            "No {} found, using defaults",
            config_path.display()
        ));
    }

    let token = if settings.drive_token().is_some() {
        "set"
    } else {
        "not set"
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![
        "state_backend".to_string(),
        backend_name(settings.state_backend).to_string(),
    ]);
    table.add_row(vec![
        "state_file".to_string(),
        settings.state_path(&ctx.data_dir).display().to_string(),
    ]);
    table.add_row(vec![
        "backup_dir".to_string(),
        settings.backup_path(&ctx.data_dir).display().to_string(),
    ]);
    table.add_row(vec![
        "sync_backend".to_string(),
        settings.sync_backend.to_string(),
    ]);
    table.add_row(vec![
        "drive_token_env".to_string(),
        format!("{} ({token})", settings.drive_token_env),
    ]);
    table.add_row(vec![
        "lock timeout".to_string(),
        format!("{} ms", ctx.store.password_validity().as_millis()),
    ]);
    println!("{table}");

    Ok(())
}

fn backend_name(backend: StateBackend) -> &'static str {
    match backend {
        StateBackend::Json => "json",
        StateBackend::Sqlite => "sqlite",
    }
}
