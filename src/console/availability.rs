// CLASSIFICATION: COMMUNITY
// Filename: availability.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Wait for the shell binary before the consoles go interactive.
//!
//! The binary's directory is watched with inotify; every event, and every
//! `interval` without one, re-checks the binary. If the directory cannot be
//! watched (it may not exist yet) the check simply repeats at `interval`.

use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;
use std::time::Duration;

use inotify::{Inotify, WatchMask};
use log::{debug, info};

use crate::util::is_executable;

fn watch_parent(path: &Path) -> Option<Inotify> {
    let parent = path.parent()?;
    let mut inotify = Inotify::init().ok()?;
    inotify
        .watches()
        .add(
            parent,
            WatchMask::CREATE | WatchMask::MOVED_TO | WatchMask::ATTRIB | WatchMask::CLOSE_WRITE,
        )
        .ok()?;
    debug!("[console] watching {} for {}", parent.display(), path.display());
    Some(inotify)
}

/// Sleep until `inotify` has events or `interval` elapses, then drain them.
fn wait_event(inotify: &mut Inotify, interval: Duration) {
    let mut pfd = libc::pollfd {
        fd: inotify.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout = interval.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
    // SAFETY: one valid pollfd record.
    let ready = unsafe { libc::poll(&mut pfd, 1, timeout) };
    if ready > 0 {
        // events left over after one read make the next poll return at once
        let mut buffer = [0u8; 1024];
        if let Err(e) = drain_events(inotify, &mut buffer) {
            debug!("[console] inotify read failed: {e}");
        }
    }
}

/// Consume pending events. An empty queue is not an error.
fn drain_events(inotify: &mut Inotify, buffer: &mut [u8]) -> io::Result<usize> {
    match inotify.read_events(buffer) {
        Ok(events) => Ok(events.count()),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
        Err(e) => Err(e),
    }
}

/// Return once `path` exists and is executable.
pub fn wait_for_executable(path: &Path, interval: Duration) {
    if is_executable(path) {
        return;
    }
    info!("[console] waiting for {}", path.display());
    let mut watcher = watch_parent(path);
    while !is_executable(path) {
        match watcher.as_mut() {
            Some(inotify) => wait_event(inotify, interval),
            None => {
                std::thread::sleep(interval);
                watcher = watch_parent(path);
            }
        }
    }
    info!("[console] {} available", path.display());
}
