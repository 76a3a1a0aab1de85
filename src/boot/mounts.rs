// CLASSIFICATION: COMMUNITY
// Filename: mounts.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Mount descriptions and the create-then-mount primitive.

use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use super::host::Host;
use crate::util::rooted;

#[derive(Debug, Error)]
pub enum MountError {
    #[error("cannot create mount point {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("mount {source_dev} on {target} ({fstype}) failed: {source}")]
    Mount {
        source_dev: String,
        target: PathBuf,
        fstype: String,
        #[source]
        source: io::Error,
    },
}

/// One filesystem to mount, with the mode its mount point is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    pub source: String,
    pub target: PathBuf,
    pub fstype: String,
    pub mode: u32,
}

impl MountSpec {
    /// Kernel-provided filesystem; the source is the type name.
    pub fn pseudo(target: impl Into<PathBuf>, fstype: &str, mode: u32) -> Self {
        Self {
            source: fstype.to_string(),
            target: target.into(),
            fstype: fstype.to_string(),
            mode,
        }
    }

    pub fn device(source: impl Into<String>, target: impl Into<PathBuf>, fstype: &str) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            fstype: fstype.to_string(),
            mode: 0o755,
        }
    }

    /// Create the target directory, then mount.
    pub fn apply<H: Host + ?Sized>(&self, host: &mut H) -> Result<(), MountError> {
        host.create_dir(&self.target, self.mode)
            .map_err(|source| MountError::Create {
                path: self.target.clone(),
                source,
            })?;
        host.mount(&self.source, &self.target, &self.fstype)
            .map_err(|source| MountError::Mount {
                source_dev: self.source.clone(),
                target: self.target.clone(),
                fstype: self.fstype.clone(),
                source,
            })?;
        debug!(
            "[mount] {} on {} type {}",
            self.source,
            self.target.display(),
            self.fstype
        );
        Ok(())
    }
}

/// `/proc`, `/sys` and `/dev` anchored at `root`.
pub fn pseudo_filesystems(root: &Path) -> Vec<MountSpec> {
    vec![
        MountSpec::pseudo(rooted(root, Path::new("/proc")), "proc", 0o555),
        MountSpec::pseudo(rooted(root, Path::new("/sys")), "sysfs", 0o555),
        MountSpec::pseudo(rooted(root, Path::new("/dev")), "devtmpfs", 0o755),
    ]
}
