// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Small filesystem helpers shared by boot and console code.

pub mod access;
pub mod paths;

pub use access::{is_executable, is_readable};
pub use paths::rooted;
