// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Raw disk access used during boot.

pub mod gpt;

pub use gpt::{resolve_label, GptError, Lookup, PartitionEntry, VolumeLabel};
