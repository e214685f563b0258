//! Session module — the unlocked state and its inactivity auto-lock.
//!
//! This module provides:
//! - `Clock` with system and manual implementations (`clock`)
//! - `SessionManager`, the lock state machine (`manager`)

pub mod clock;
pub mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{LockState, SessionManager};
