// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v1.1
// Date Modified: 2026-10-19
// Author: Lukas Bower

//! Root library for `rdinit`, the ramdisk init.
//!
//! Boot runs once ([`boot::BootSequence`]), then the consoles are served
//! forever ([`console::Multiplexer`]).

/// Deployment configuration (`/etc/init.conf`).
pub mod config;

/// GPT label lookup on the raw boot disk.
pub mod disk;

/// Ordered boot steps and the system-call seam they run against.
pub mod boot;

/// Console hand-over to interactive shells.
pub mod console;

/// Launching and reaping child processes.
pub mod process;

/// Filesystem helpers shared across modules.
pub mod util;
