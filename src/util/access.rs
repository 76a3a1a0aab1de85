// CLASSIFICATION: COMMUNITY
// Filename: access.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! `access(2)` checks against the real uid.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

fn access(path: &Path, mode: libc::c_int) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string for the call.
    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}

pub fn is_executable(path: &Path) -> bool {
    access(path, libc::X_OK)
}

pub fn is_readable(path: &Path) -> bool {
    access(path, libc::R_OK)
}
