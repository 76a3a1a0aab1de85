// CLASSIFICATION: COMMUNITY
// Filename: session.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Per-console state: the open terminal, the last two bytes typed on it and
//! whether a shell already owns it.
//!
//! An Idle console whose line hangs up (end of file, a read error, or a
//! carrier drop on serial) is marked hung up and no longer watched. It is
//! still Idle: no shell owns it, and it can never become Active.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("cannot open console {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("console poll failed: {0}")]
    Poll(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleKind {
    /// VT display; already the controlling terminal of anything reading it.
    Display,
    /// Serial line; a shell here needs its own session to own the tty.
    Serial,
}

/// Sliding window over the last two bytes read from a console.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerBuffer([u8; 2]);

impl TriggerBuffer {
    pub fn push(&mut self, byte: u8) {
        self.0 = [self.0[1], byte];
    }

    /// ASCII case-insensitive comparison against `trigger`.
    pub fn matches(&self, trigger: &[u8; 2]) -> bool {
        self.0.eq_ignore_ascii_case(trigger)
    }

    pub fn clear(&mut self) {
        self.0 = [0; 2];
    }
}

/// One console and its hand-over state. Idle until the trigger is typed,
/// then Active for the rest of the process lifetime.
#[derive(Debug)]
pub struct ConsoleSession {
    name: String,
    kind: ConsoleKind,
    file: File,
    buffer: TriggerBuffer,
    active: bool,
    hung_up: bool,
}

impl ConsoleSession {
    /// Open `path` read-write. The session is named after the device node.
    pub fn open(path: &Path, kind: ConsoleKind) -> Result<Self, ConsoleError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| ConsoleError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_file(name, kind, file))
    }

    pub fn from_file(name: impl Into<String>, kind: ConsoleKind, file: File) -> Self {
        Self {
            name: name.into(),
            kind,
            file,
            buffer: TriggerBuffer::default(),
            active: false,
            hung_up: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ConsoleKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_hung_up(&self) -> bool {
        self.hung_up
    }

    /// Idle and still connected: the multiplexer polls these only.
    pub fn is_watched(&self) -> bool {
        !self.active && !self.hung_up
    }

    pub fn mark_hung_up(&mut self) {
        self.hung_up = true;
    }

    /// Read exactly one byte. `Ok(None)` on end of file.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.file.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Feed one byte; returns true when it completes the trigger. The
    /// session is then Active and its buffer cleared. Active sessions ignore
    /// further input.
    pub fn feed(&mut self, byte: u8, trigger: &[u8; 2]) -> bool {
        if self.active {
            return false;
        }
        self.buffer.push(byte);
        if !self.buffer.matches(trigger) {
            return false;
        }
        self.active = true;
        self.buffer.clear();
        true
    }

    /// Write the hand-over notice to the console itself.
    pub fn announce(&mut self) -> io::Result<()> {
        writeln!(self.file, "Launching shell on {}...", self.name)
    }
}

impl AsRawFd for ConsoleSession {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ConsoleSession {
        let file = tempfile::tempfile().unwrap();
        ConsoleSession::from_file("tty0", ConsoleKind::Display, file)
    }

    #[test]
    fn buffer_keeps_last_two_bytes() {
        let mut buf = TriggerBuffer::default();
        for b in b"xyz" {
            buf.push(*b);
        }
        assert_eq!(buf, TriggerBuffer(*b"yz"));
    }

    #[test]
    fn trigger_is_case_insensitive() {
        for input in [b"sh", b"SH", b"Sh", b"sH"] {
            let mut s = session();
            assert!(!s.feed(input[0], b"sh"));
            assert!(s.feed(input[1], b"sh"));
            assert!(s.is_active());
            assert_eq!(s.buffer, TriggerBuffer::default());
        }
    }

    #[test]
    fn unrelated_bytes_stay_idle() {
        let mut s = session();
        for b in b"hs s h\nls\r" {
            assert!(!s.feed(*b, b"sh"));
        }
        assert!(!s.is_active());
    }

    #[test]
    fn trigger_found_after_noise() {
        let mut s = session();
        let fired: Vec<bool> = b"xxsh".iter().map(|b| s.feed(*b, b"sh")).collect();
        assert_eq!(fired, vec![false, false, false, true]);
    }

    #[test]
    fn active_session_never_fires_again() {
        let mut s = session();
        s.feed(b's', b"sh");
        assert!(s.feed(b'h', b"sh"));
        assert!(!s.feed(b's', b"sh"));
        assert!(!s.feed(b'h', b"sh"));
        assert!(s.is_active());
    }

    #[test]
    fn hung_up_session_is_idle_but_unwatched() {
        let mut s = session();
        assert!(s.is_watched());
        s.mark_hung_up();
        assert!(s.is_hung_up());
        assert!(!s.is_active());
        assert!(!s.is_watched());
    }

    #[test]
    fn open_missing_console_fails() {
        let err = ConsoleSession::open(Path::new("/nonexistent/ttyS9"), ConsoleKind::Serial)
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Open { .. }));
    }
}
