use clap::Parser;
use passordr::cli::commands;
use passordr::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    passordr::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Vault { ref action } => commands::vault::execute(&cli, action),
        Commands::Show => commands::show::execute(&cli),
        Commands::Hint { ref text } => commands::edit::execute_hint(&cli, text),
        Commands::Add { ref names } => commands::edit::execute_add(&cli, names),
        Commands::RenameService { index, ref name } => {
            commands::edit::execute_rename(&cli, index, name)
        }
        Commands::Outdate { index } => commands::edit::execute_outdate(&cli, index),
        Commands::History { last } => commands::history::execute(&cli, last),
        Commands::Password { remove } => commands::password::execute(&cli, remove),
        Commands::Backup { backend } => commands::backup::execute_backup(&cli, backend),
        Commands::Restore {
            ref backup_id,
            backend,
            force,
        } => commands::backup::execute_restore(&cli, backup_id.as_deref(), backend, force),
        Commands::Backups { ref action } => commands::backup::execute_backups(&cli, action),
        Commands::LockTimeout { ms } => commands::lock_timeout::execute(&cli, ms),
        Commands::Config => commands::config::execute(&cli),
        Commands::Completions { ref shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        passordr::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
