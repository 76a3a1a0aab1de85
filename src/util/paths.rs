// CLASSIFICATION: COMMUNITY
// Filename: paths.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::path::{Path, PathBuf};

/// Re-anchor an absolute `path` under `root`: `rooted("/mnt", "/bin/sh")` is `/mnt/bin/sh`.
pub fn rooted(root: &Path, path: &Path) -> PathBuf {
    let relative = path.strip_prefix("/").unwrap_or(path);
    if relative.as_os_str().is_empty() {
        return root.to_path_buf();
    }
    root.join(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_absolute_paths() {
        assert_eq!(
            rooted(Path::new("/mnt"), Path::new("/bin/busybox")),
            PathBuf::from("/mnt/bin/busybox")
        );
        assert_eq!(rooted(Path::new("/mnt"), Path::new("/")), PathBuf::from("/mnt"));
        assert_eq!(
            rooted(Path::new("/mnt/"), Path::new("proc")),
            PathBuf::from("/mnt/proc")
        );
    }
}
