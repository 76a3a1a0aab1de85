// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Interactive consoles served after boot.

pub mod availability;
pub mod multiplexer;
pub mod session;

pub use availability::wait_for_executable;
pub use multiplexer::Multiplexer;
pub use session::{ConsoleError, ConsoleKind, ConsoleSession, TriggerBuffer};

use crate::config::ConsoleConfig;

/// Open the display and serial consoles. Both must open.
pub fn open_consoles(cfg: &ConsoleConfig) -> Result<Vec<ConsoleSession>, ConsoleError> {
    Ok(vec![
        ConsoleSession::open(&cfg.primary, ConsoleKind::Display)?,
        ConsoleSession::open(&cfg.serial, ConsoleKind::Serial)?,
    ])
}
