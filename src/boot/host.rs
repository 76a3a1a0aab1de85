// CLASSIFICATION: COMMUNITY
// Filename: host.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! System calls used by the boot sequence.
//!
//! [`Host`] is the seam between boot ordering and the kernel; [`LinuxHost`]
//! performs the real calls.

use std::ffi::CString;
use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;

use crate::disk::gpt::{self, GptResult, Lookup, VolumeLabel};
use crate::util;

pub trait Host {
    /// Create `path` and any missing parents with `mode`; existing directories are fine.
    fn create_dir(&mut self, path: &Path, mode: u32) -> io::Result<()>;

    fn mount(&mut self, source: &str, target: &Path, fstype: &str) -> io::Result<()>;

    fn change_root(&mut self, path: &Path) -> io::Result<()>;

    fn change_dir(&mut self, path: &Path) -> io::Result<()>;

    fn is_executable(&self, path: &Path) -> bool;

    fn is_readable(&self, path: &Path) -> bool;

    /// Byte-copy `from` to `to`, creating or truncating `to` with `mode`.
    fn copy_file(&mut self, from: &Path, to: &Path, mode: u32) -> io::Result<u64>;

    fn resolve_label(&mut self, device: &Path, label: &VolumeLabel) -> GptResult<Lookup> {
        gpt::resolve_label(device, label)
    }
}

fn c_path(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

fn c_str(s: &str) -> io::Result<CString> {
    CString::new(s).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

/// Host backed by the running kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxHost;

impl Host for LinuxHost {
    fn create_dir(&mut self, path: &Path, mode: u32) -> io::Result<()> {
        DirBuilder::new().recursive(true).mode(mode).create(path)
    }

    fn mount(&mut self, source: &str, target: &Path, fstype: &str) -> io::Result<()> {
        let source = c_str(source)?;
        let target = c_path(target)?;
        let fstype = c_str(fstype)?;
        // SAFETY: all pointers are valid NUL-terminated strings; no mount data.
        let rc = unsafe {
            libc::mount(
                source.as_ptr(),
                target.as_ptr(),
                fstype.as_ptr(),
                0,
                std::ptr::null(),
            )
        };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    fn change_root(&mut self, path: &Path) -> io::Result<()> {
        std::os::unix::fs::chroot(path)
    }

    fn change_dir(&mut self, path: &Path) -> io::Result<()> {
        std::env::set_current_dir(path)
    }

    fn is_executable(&self, path: &Path) -> bool {
        util::is_executable(path)
    }

    fn is_readable(&self, path: &Path) -> bool {
        util::is_readable(path)
    }

    fn copy_file(&mut self, from: &Path, to: &Path, mode: u32) -> io::Result<u64> {
        let mut src = File::open(from)?;
        let mut dst = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(mode)
            .open(to)?;
        let copied = io::copy(&mut src, &mut dst)?;
        // an existing file keeps its old mode through open(2)
        fs::set_permissions(to, fs::Permissions::from_mode(mode))?;
        Ok(copied)
    }
}
