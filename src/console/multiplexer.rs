// CLASSIFICATION: COMMUNITY
// Filename: multiplexer.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Console multiplexer: watches the idle consoles for the trigger sequence
//! and hands each one to its own shell exactly once.
//!
//! Once a console is handed over it drops out of the poll set for good. If
//! init kept reading it, init and the shell would both be readers of the same
//! tty and keystrokes would go to whichever process the kernel woke first.
//! A console that hangs up while Idle leaves the poll set too, since a
//! hung-up descriptor polls readable forever.

use std::io;
use std::os::fd::AsRawFd;
use std::path::PathBuf;
use std::time::Duration;

use log::{error, info, warn};

use super::session::{ConsoleError, ConsoleKind, ConsoleSession};
use crate::process::{reap_exited, Completion, Launcher, Program};

pub struct Multiplexer<L: Launcher> {
    sessions: Vec<ConsoleSession>,
    trigger: [u8; 2],
    shell: PathBuf,
    launcher: L,
}

impl<L: Launcher> Multiplexer<L> {
    pub fn new(sessions: Vec<ConsoleSession>, trigger: [u8; 2], shell: PathBuf, launcher: L) -> Self {
        Self {
            sessions,
            trigger,
            shell,
            launcher,
        }
    }

    pub fn sessions(&self) -> &[ConsoleSession] {
        &self.sessions
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// True while some console is Idle and still connected.
    pub fn has_idle(&self) -> bool {
        self.sessions.iter().any(ConsoleSession::is_watched)
    }

    /// Block until at least one watched console is readable, then consume
    /// one byte from each readable one. Returns the names of consoles
    /// handed to a shell during this call.
    pub fn step(&mut self) -> Result<Vec<String>, ConsoleError> {
        let idle: Vec<usize> = (0..self.sessions.len())
            .filter(|&i| self.sessions[i].is_watched())
            .collect();
        if idle.is_empty() {
            return Ok(Vec::new());
        }
        let mut fds: Vec<libc::pollfd> = idle
            .iter()
            .map(|&i| libc::pollfd {
                fd: self.sessions[i].as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();
        // SAFETY: `fds` is a valid array of `fds.len()` pollfd records.
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(ConsoleError::Poll(err));
        }

        let mut handed = Vec::new();
        for (pfd, &i) in fds.iter().zip(idle.iter()) {
            if pfd.revents & libc::POLLIN != 0 {
                if self.service(i) {
                    handed.push(self.sessions[i].name().to_string());
                }
            } else if pfd.revents & (libc::POLLHUP | libc::POLLERR | libc::POLLNVAL) != 0 {
                let session = &mut self.sessions[i];
                warn!("[console] {} hung up; no longer watched", session.name());
                session.mark_hung_up();
            }
        }
        Ok(handed)
    }

    /// Read one byte from session `i` and launch a shell if it completes the
    /// trigger.
    fn service(&mut self, i: usize) -> bool {
        let trigger = self.trigger;
        let session = &mut self.sessions[i];
        let byte = match session.read_byte() {
            Ok(Some(b)) => b,
            Ok(None) => {
                warn!("[console] {} reached end of file; no longer watched", session.name());
                session.mark_hung_up();
                return false;
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return false,
            Err(e) => {
                warn!("[console] read from {}: {e}; no longer watched", session.name());
                session.mark_hung_up();
                return false;
            }
        };
        if !session.feed(byte, &trigger) {
            return false;
        }
        if let Err(e) = session.announce() {
            warn!("[console] write to {}: {e}", session.name());
        }
        let program = Program::new(&self.shell)
            .arg0("sh")
            .console(session.as_raw_fd(), session.kind() == ConsoleKind::Serial);
        match self.launcher.launch(&program, Completion::Detach) {
            Ok(_) => info!("[console] shell started on {}", session.name()),
            Err(e) => error!("[console] shell on {}: {e}", session.name()),
        }
        true
    }

    /// Serve the consoles forever. Exited children are reaped after every
    /// wake-up; once no console is left to watch only reaping remains.
    pub fn run(mut self, idle_interval: Duration) -> ! {
        loop {
            if !self.has_idle() {
                park_reaping(idle_interval);
                continue;
            }
            if let Err(e) = self.step() {
                error!("[console] {e}");
                std::thread::sleep(idle_interval);
            }
            reap_exited();
        }
    }
}

/// Block in `waitpid` until a child exits; sleep when there are none.
fn park_reaping(interval: Duration) {
    let mut status: libc::c_int = 0;
    // SAFETY: plain syscall with a valid out-pointer.
    let pid = unsafe { libc::waitpid(-1, &mut status, 0) };
    if pid <= 0 {
        std::thread::sleep(interval);
    }
}
