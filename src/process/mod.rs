// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Child process management.

pub mod launcher;
pub mod reaper;

pub use launcher::{
    Completion, ConsoleBinding, LaunchError, LaunchResult, Launched, Launcher, Program,
    SystemLauncher,
};
pub use reaper::reap_exited;
