//! Command implementations, one module per subcommand group.

pub mod backup;
pub mod completions;
pub mod config;
pub mod edit;
pub mod history;
pub mod lock_timeout;
pub mod password;
pub mod show;
pub mod vault;
