// CLASSIFICATION: COMMUNITY
// Filename: mod.rs · rdinit boot subsystem
// Date Modified: 2026-10-19
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// rdinit Boot Subsystem – Root Module
//
// Everything that runs once, between the kernel handing control
// to the ramdisk and the consoles going interactive.
//
// ## Sub‑modules
// * `host`         – system-call seam (mount, chroot, copy).
// * `mounts`       – mount descriptions, create-then-mount.
// * `orchestrator` – ordered boot steps and their failure policy.
// ─────────────────────────────────────────────────────────────

pub mod host;
pub mod mounts;
pub mod orchestrator;

pub use host::{Host, LinuxHost};
pub use mounts::{pseudo_filesystems, MountError, MountSpec};
pub use orchestrator::{install_symlinks, BootError, BootReport, BootSequence, Step, StepOutcome};
