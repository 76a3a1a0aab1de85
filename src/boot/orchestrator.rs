// CLASSIFICATION: COMMUNITY
// Filename: orchestrator.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! One-shot boot sequence: ramdisk mounts, root lookup and mount, switch
//! root, BusyBox bootstrap, ESP mount and archive overlay.
//!
//! Steps run strictly in order and are never retried. Three failures abort
//! the remaining steps: the root label is not found, the root cannot be
//! mounted, or the switch into it fails. Everything else is logged and the
//! sequence continues.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use super::host::Host;
use super::mounts::{pseudo_filesystems, MountError, MountSpec};
use crate::config::{BootConfig, ShellConfig};
use crate::disk::gpt::{Lookup, VolumeLabel};
use crate::process::{Completion, Launched, Launcher, Program};
use crate::util::rooted;

/// Failures that end the boot sequence early.
#[derive(Debug, Error)]
pub enum BootError {
    #[error("root partition labelled {label:?} not found on {}", device.display())]
    RootNotFound { label: String, device: PathBuf },
    #[error("root mount failed: {0}")]
    RootMount(#[source] MountError),
    #[error("switch into {} failed: {source}", path.display())]
    SwitchRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    EarlyMounts,
    ResolveRoot,
    MountRoot,
    RootPseudoMounts,
    CopyShell,
    SwitchRoot,
    InstallSymlinks,
    SearchPath,
    MountEsp,
    ExtractArchive,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::EarlyMounts => "early-mounts",
            Step::ResolveRoot => "resolve-root",
            Step::MountRoot => "mount-root",
            Step::RootPseudoMounts => "root-pseudo-mounts",
            Step::CopyShell => "copy-shell",
            Step::SwitchRoot => "switch-root",
            Step::InstallSymlinks => "install-symlinks",
            Step::SearchPath => "search-path",
            Step::MountEsp => "mount-esp",
            Step::ExtractArchive => "extract-archive",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// Nothing to do (absent input); not a failure.
    Skipped(String),
    /// Failed, logged, sequence continued.
    Failed(String),
    /// Failed and ended the sequence.
    Aborted,
}

/// What happened during [`BootSequence::run`].
#[derive(Debug, Default)]
pub struct BootReport {
    pub steps: Vec<(Step, StepOutcome)>,
    pub aborted: Option<BootError>,
}

impl BootReport {
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, o)| o)
    }

    /// True when the process now runs inside the resolved root.
    pub fn switched_root(&self) -> bool {
        self.outcome(Step::SwitchRoot) == Some(&StepOutcome::Done)
    }

    fn record(&mut self, step: Step, outcome: StepOutcome) {
        match &outcome {
            StepOutcome::Done => info!("[boot] {step}: done"),
            StepOutcome::Skipped(why) => info!("[boot] {step}: skipped ({why})"),
            StepOutcome::Failed(why) => warn!("[boot] {step}: {why}; continuing"),
            StepOutcome::Aborted => {}
        }
        self.steps.push((step, outcome));
    }
}

/// Run the shell binary's self-install so every applet gets a symlink in the
/// binary directory. Blocks until the installer exits.
pub fn install_symlinks<H, L>(shell: &ShellConfig, host: &H, launcher: &mut L) -> StepOutcome
where
    H: Host + ?Sized,
    L: Launcher + ?Sized,
{
    if !host.is_executable(&shell.binary) {
        return StepOutcome::Skipped(format!("{} not executable", shell.binary.display()));
    }
    let program = Program::new(&shell.binary).args([
        "--install".to_string(),
        "-s".to_string(),
        shell.bin_dir.display().to_string(),
    ]);
    waited(launcher, &program)
}

fn waited<L: Launcher + ?Sized>(launcher: &mut L, program: &Program) -> StepOutcome {
    match launcher.launch(program, Completion::Wait) {
        Ok(Launched::Exited(status)) if !status.success() => {
            StepOutcome::Failed(format!("{} exited with {status}", program.path.display()))
        }
        Ok(_) => StepOutcome::Done,
        Err(e) => StepOutcome::Failed(e.to_string()),
    }
}

fn mount_all<H: Host + ?Sized>(host: &mut H, specs: &[MountSpec]) -> StepOutcome {
    let mut failures = Vec::new();
    for spec in specs {
        if let Err(e) = spec.apply(&mut *host) {
            failures.push(e.to_string());
        }
    }
    if failures.is_empty() {
        StepOutcome::Done
    } else {
        StepOutcome::Failed(failures.join("; "))
    }
}

/// Drives the boot steps against a [`Host`] and a [`Launcher`].
pub struct BootSequence<'a, H: Host + ?Sized, L: Launcher + ?Sized> {
    config: &'a BootConfig,
    host: &'a mut H,
    launcher: &'a mut L,
    report: BootReport,
}

impl<'a, H: Host + ?Sized, L: Launcher + ?Sized> BootSequence<'a, H, L> {
    pub fn new(config: &'a BootConfig, host: &'a mut H, launcher: &'a mut L) -> Self {
        Self {
            config,
            host,
            launcher,
            report: BootReport::default(),
        }
    }

    /// Run every step, stopping at the first abort-class failure.
    pub fn run(mut self) -> BootReport {
        if let Err(e) = self.run_steps() {
            warn!("[boot] sequence aborted: {e}");
            self.report.aborted = Some(e);
        }
        self.report
    }

    fn run_steps(&mut self) -> Result<(), BootError> {
        let cfg = self.config;
        let new_root = cfg.root.mount_point.as_path();

        let outcome = mount_all(&mut *self.host, &pseudo_filesystems(Path::new("/")));
        self.report.record(Step::EarlyMounts, outcome);

        let index = match self.lookup(&cfg.root.label) {
            Some(index) => index,
            None => {
                self.report.record(Step::ResolveRoot, StepOutcome::Aborted);
                return Err(BootError::RootNotFound {
                    label: cfg.root.label.clone(),
                    device: cfg.disk.device.clone(),
                });
            }
        };
        self.report.record(Step::ResolveRoot, StepOutcome::Done);

        let root_dev = cfg.partition_device(index);
        let root_mount = MountSpec::device(
            root_dev.display().to_string(),
            new_root,
            &cfg.root.fstype,
        );
        if let Err(e) = root_mount.apply(&mut *self.host) {
            self.report.record(Step::MountRoot, StepOutcome::Aborted);
            return Err(BootError::RootMount(e));
        }
        self.report.record(Step::MountRoot, StepOutcome::Done);

        let outcome = mount_all(&mut *self.host, &pseudo_filesystems(new_root));
        self.report.record(Step::RootPseudoMounts, outcome);

        let outcome = self.copy_shell(new_root);
        self.report.record(Step::CopyShell, outcome);

        let switched = self
            .host
            .change_root(new_root)
            .map_err(|source| BootError::SwitchRoot {
                path: new_root.to_path_buf(),
                source,
            })
            .and_then(|()| {
                self.host
                    .change_dir(Path::new("/"))
                    .map_err(|source| BootError::SwitchRoot {
                        path: PathBuf::from("/"),
                        source,
                    })
            });
        if let Err(e) = switched {
            self.report.record(Step::SwitchRoot, StepOutcome::Aborted);
            return Err(e);
        }
        self.report.record(Step::SwitchRoot, StepOutcome::Done);

        let outcome = install_symlinks(&cfg.shell, &*self.host, &mut *self.launcher);
        self.report.record(Step::InstallSymlinks, outcome);

        self.launcher.set_search_path(&cfg.shell.path);
        self.report.record(Step::SearchPath, StepOutcome::Done);

        let outcome = self.mount_esp();
        self.report.record(Step::MountEsp, outcome);

        let outcome = self.extract_archive();
        self.report.record(Step::ExtractArchive, outcome);
        Ok(())
    }

    /// Resolve a label on the boot disk. Open/seek errors and a truncated
    /// entry array are logged and treated as "not found".
    fn lookup(&mut self, label: &str) -> Option<u32> {
        let device = &self.config.disk.device;
        match self.host.resolve_label(device, &VolumeLabel::new(label)) {
            Ok(Lookup::Found(index)) => {
                info!("[boot] label {label:?} is partition {index}");
                Some(index)
            }
            Ok(Lookup::NotFound) => {
                info!("[boot] label {label:?} not present on {}", device.display());
                None
            }
            Ok(Lookup::Truncated { scanned }) => {
                warn!(
                    "[boot] partition entries on {} end after {scanned}; label {label:?} not found",
                    device.display()
                );
                None
            }
            Err(e) => {
                warn!("[boot] label {label:?}: {e}");
                None
            }
        }
    }

    fn copy_shell(&mut self, new_root: &Path) -> StepOutcome {
        let shell = &self.config.shell;
        let bin_dir = rooted(new_root, &shell.bin_dir);
        if let Err(e) = self.host.create_dir(&bin_dir, 0o755) {
            return StepOutcome::Failed(format!("cannot create {}: {e}", bin_dir.display()));
        }
        let dest = rooted(new_root, &shell.binary);
        match self.host.copy_file(&shell.binary, &dest, 0o755) {
            Ok(bytes) => {
                info!("[boot] copied {} ({bytes} bytes) to {}", shell.binary.display(), dest.display());
                StepOutcome::Done
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                StepOutcome::Skipped(format!("{} absent", shell.binary.display()))
            }
            Err(e) => StepOutcome::Failed(format!("copy to {}: {e}", dest.display())),
        }
    }

    fn mount_esp(&mut self) -> StepOutcome {
        let cfg = self.config;
        let Some(index) = self.lookup(&cfg.esp.label) else {
            return StepOutcome::Skipped(format!("no {:?} partition", cfg.esp.label));
        };
        let spec = MountSpec::device(
            cfg.partition_device(index).display().to_string(),
            &cfg.esp.mount_point,
            &cfg.esp.fstype,
        );
        match spec.apply(&mut *self.host) {
            Ok(()) => StepOutcome::Done,
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    }

    fn extract_archive(&mut self) -> StepOutcome {
        let shell = &self.config.shell;
        if !self.host.is_readable(&shell.archive) {
            return StepOutcome::Skipped(format!("{} not readable", shell.archive.display()));
        }
        let script = format!("gzip -dc {} | cpio -id", shell.archive.display());
        let program = Program::new(&shell.binary).arg0("sh").args(["-c".to_string(), script]);
        waited(&mut *self.launcher, &program)
    }
}
