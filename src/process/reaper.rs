// CLASSIFICATION: COMMUNITY
// Filename: reaper.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Zombie reaping for PID 1.
//!
//! Orphans are re-parented to init, and detached shells are never waited on
//! by their launcher, so exited children are collected here.

use log::debug;

/// Collect every child that has already exited without blocking.
/// Returns the number of children reaped.
pub fn reap_exited() -> usize {
    let mut reaped = 0;
    loop {
        let mut status: libc::c_int = 0;
        // SAFETY: plain syscall with a valid out-pointer.
        let pid = unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG) };
        if pid <= 0 {
            break;
        }
        debug!("[reaper] collected pid {pid} (status {status:#x})");
        reaped += 1;
    }
    reaped
}
