// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Deployment configuration for the ramdisk init.
//!
//! Every device path, label, mount point and console used during boot lives
//! here. The defaults describe the stock image; `/etc/init.conf` (TOML, path
//! overridable through `RDINIT_CONF`) may replace any subset of them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

/// Default location of the init configuration file.
pub const DEFAULT_CONF_PATH: &str = "/etc/init.conf";

/// Errors raised while reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Raw disk holding the partition table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiskConfig {
    /// Whole-disk block device; partition `n` is `<device><n>`.
    pub device: PathBuf,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/sda"),
        }
    }
}

/// The real root filesystem.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RootConfig {
    pub label: String,
    pub mount_point: PathBuf,
    pub fstype: String,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            label: "primary".into(),
            mount_point: PathBuf::from("/mnt"),
            fstype: "ext4".into(),
        }
    }
}

/// The EFI system partition, mounted after the root switch when present.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EspConfig {
    pub label: String,
    pub mount_point: PathBuf,
    pub fstype: String,
}

impl Default for EspConfig {
    fn default() -> Self {
        Self {
            label: "ESP".into(),
            mount_point: PathBuf::from("/boot/efi"),
            fstype: "vfat".into(),
        }
    }
}

/// Shell runtime (BusyBox) and everything launched through it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    /// Multi-call binary, at the same path in the ramdisk and the new root.
    pub binary: PathBuf,
    /// Directory receiving the binary copy and the command symlinks.
    pub bin_dir: PathBuf,
    /// PATH handed to every spawned program once the root is switched.
    pub path: String,
    /// Compressed cpio archive extracted over the new root, when readable.
    pub archive: PathBuf,
    /// Fallback re-check interval while waiting for the binary, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("/bin/busybox"),
            bin_dir: PathBuf::from("/bin"),
            path: "/bin:/usr/bin".into(),
            archive: PathBuf::from("/boot/initramfs.cpio.gz"),
            poll_interval_secs: 10,
        }
    }
}

impl ShellConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// The two interactive consoles.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Display console; already a controlling terminal for its readers.
    pub primary: PathBuf,
    /// Serial console; shells started here get a fresh session.
    pub serial: PathBuf,
    /// Two-character sequence handing a console to a shell.
    pub trigger: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("/dev/tty0"),
            serial: PathBuf::from("/dev/ttyS0"),
            trigger: "sh".into(),
        }
    }
}

/// Complete init configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BootConfig {
    pub disk: DiskConfig,
    pub root: RootConfig,
    pub esp: EspConfig,
    pub shell: ShellConfig,
    pub consoles: ConsoleConfig,
}

impl BootConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Load the active configuration, falling back to defaults.
    ///
    /// A missing file is the normal case on the stock image and is not
    /// reported; an unreadable or malformed one is logged and ignored.
    pub fn load() -> Self {
        let path = std::env::var_os("RDINIT_CONF")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONF_PATH));
        match Self::from_file(&path) {
            Ok(cfg) => {
                debug!("[config] loaded {}", path.display());
                cfg
            }
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                warn!("[config] {e}; using defaults");
                Self::default()
            }
        }
    }

    /// Block device node for partition `index` of the boot disk.
    pub fn partition_device(&self, index: u32) -> PathBuf {
        let mut dev = self.disk.device.clone().into_os_string();
        dev.push(index.to_string());
        PathBuf::from(dev)
    }

    /// Trigger sequence as two bytes, if it is exactly two ASCII characters.
    pub fn trigger_bytes(&self) -> Option<[u8; 2]> {
        match self.consoles.trigger.as_bytes() {
            [a, b] if a.is_ascii() && b.is_ascii() => Some([*a, *b]),
            _ => None,
        }
    }
}
