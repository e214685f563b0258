//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::sync::CloudObject;
use crate::vault::{HistoryEntry, UpdateType, VaultRecord, VaultSnapshot};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the vault list, marking the current one.
pub fn print_vaults_table(vaults: &[VaultRecord], current_id: &str) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Name", "Id", "Password", "Last update", "Last backup"]);

    for v in vaults {
        let last_backup = [v.local_file_backup.as_ref(), v.cloud_backup.as_ref()]
            .into_iter()
            .flatten()
            .map(|m| m.last_backup_date)
            .max()
            .map_or_else(|| "never".to_string(), |d| d.format(DATE_FORMAT).to_string());

        table.add_row(vec![
            if v.id == current_id { "*" } else { "" }.to_string(),
            v.name.clone(),
            v.id.clone(),
            if v.has_password { "yes" } else { "no" }.to_string(),
            v.last_update.format(DATE_FORMAT).to_string(),
            last_backup,
        ]);
    }

    println!("{table}");
}

/// Print a decrypted vault: hint, then numbered services.
pub fn print_snapshot(name: &str, snapshot: &VaultSnapshot) {
    println!("{}", style(name).bold().underlined());
    println!();
    println!("{}", style("HINT").dim());
    if snapshot.hint.is_empty() {
        println!("{}", style("(empty)").dim());
    } else {
        println!("{}", snapshot.hint);
    }
    println!();
    println!("{}", style("SERVICES").dim());

    if snapshot.services.is_empty() {
        tip("Run `passordr add <NAME>` to add your first service.");
        return;
    }

    for (i, service) in snapshot.services.iter().enumerate() {
        let index = style(format!("{i:>3}")).dim();
        if service.outdated {
            println!(
                "{index} {} {}",
                style(&service.name).dim(),
                style("(outdated)").yellow()
            );
        } else {
            println!("{index} {}", service.name);
        }
    }
}

fn update_label(kind: UpdateType) -> &'static str {
    match kind {
        UpdateType::Added => "added",
        UpdateType::Update => "renamed",
        UpdateType::Outdate => "outdated",
    }
}

/// Print history entries, newest first.
pub fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        info("No changes recorded yet.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["When", "#", "Change", "From", "To"]);

    for entry in entries.iter().rev() {
        let when = entry.timestamp.format(DATE_FORMAT).to_string();
        if let Some(hint) = &entry.hint {
            table.add_row(vec![
                when.clone(),
                String::new(),
                "hint".to_string(),
                hint.hint_from.clone(),
                hint.hint_to.clone(),
            ]);
        }
        for update in &entry.updates {
            table.add_row(vec![
                when.clone(),
                update.service_index.to_string(),
                update_label(update.kind).to_string(),
                update.service_name_from.clone(),
                update.service_name_to.clone(),
            ]);
        }
    }

    println!("{table}");
}

/// Print a table of cloud backups.
pub fn print_backups_table(objects: &[CloudObject]) {
    if objects.is_empty() {
        info("No cloud backups yet.");
        tip("Run `passordr backup --backend cloud` to create one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Vault", "Description", "Modified"]);

    for o in objects {
        let description = if o.description.is_empty() {
            "Unnamed".to_string()
        } else {
            o.description.clone()
        };
        table.add_row(vec![
            o.id.clone(),
            o.name.clone(),
            description,
            o.modified_time.format(DATE_FORMAT).to_string(),
        ]);
    }

    println!("{table}");
}
