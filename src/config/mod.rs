//! Configuration loaded from `passordr.toml` in the data directory.

pub mod settings;

pub use settings::{Settings, StateBackend};
