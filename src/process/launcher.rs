// CLASSIFICATION: COMMUNITY
// Filename: launcher.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Launching external programs.
//!
//! Every child started by init goes through [`Launcher::launch`]: the BusyBox
//! symlink install, the archive extraction and the console shells. Whether the
//! caller waits is part of the request, and the PATH set during boot is applied
//! per launch instead of through the process environment.
//!
//! A console binding rebinds stdio to the console first. For a controlling
//! terminal the child then starts a new session and claims the tty through
//! fd 0, so the claim always targets the rebound console.

use std::fs::File;
use std::io;
use std::os::fd::{BorrowedFd, RawFd};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use log::debug;
use thiserror::Error;

/// Errors raised while starting or waiting on a child.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for {path}: {source}")]
    Wait {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot duplicate console descriptor {fd}: {source}")]
    Console {
        fd: RawFd,
        #[source]
        source: io::Error,
    },
}

pub type LaunchResult<T> = Result<T, LaunchError>;

/// Terminal a child takes as stdin, stdout and stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleBinding {
    /// Descriptor owned by the caller; it must stay open across the launch.
    pub fd: RawFd,
    /// Start a new session and adopt the terminal as controlling tty.
    pub controlling_tty: bool,
}

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub path: PathBuf,
    /// `argv[0]` when it differs from `path` (multi-call binaries dispatch on it).
    pub arg0: Option<String>,
    pub args: Vec<String>,
    pub console: Option<ConsoleBinding>,
}

impl Program {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            arg0: None,
            args: Vec::new(),
            console: None,
        }
    }

    pub fn arg0(mut self, name: impl Into<String>) -> Self {
        self.arg0 = Some(name.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn console(mut self, fd: RawFd, controlling_tty: bool) -> Self {
        self.console = Some(ConsoleBinding { fd, controlling_tty });
        self
    }
}

/// Whether the caller suspends until the child exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Wait,
    Detach,
}

/// Result of a successful launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
    /// The child ran to completion.
    Exited(ExitStatus),
    /// The child keeps running; the caller did not wait.
    Running(u32),
}

/// Seam between boot logic and process creation.
pub trait Launcher {
    /// Start `program`, waiting for it when `completion` is [`Completion::Wait`].
    fn launch(&mut self, program: &Program, completion: Completion) -> LaunchResult<Launched>;

    /// PATH given to every later launch.
    fn set_search_path(&mut self, path: &str);
}

/// Launcher backed by `fork`/`exec` through [`Command`].
#[derive(Debug, Default)]
pub struct SystemLauncher {
    search_path: Option<String>,
}

impl SystemLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    fn command(&self, program: &Program) -> LaunchResult<Command> {
        let mut cmd = Command::new(&program.path);
        if let Some(arg0) = &program.arg0 {
            cmd.arg0(arg0);
        }
        cmd.args(&program.args);
        if let Some(path) = &self.search_path {
            cmd.env("PATH", path);
        }
        if let Some(binding) = &program.console {
            bind_console(&mut cmd, binding)?;
        }
        Ok(cmd)
    }
}

fn console_stdio(fd: RawFd) -> LaunchResult<Stdio> {
    // SAFETY: the caller keeps `fd` open for the duration of the launch.
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    let owned = borrowed
        .try_clone_to_owned()
        .map_err(|source| LaunchError::Console { fd, source })?;
    Ok(Stdio::from(File::from(owned)))
}

fn bind_console(cmd: &mut Command, binding: &ConsoleBinding) -> LaunchResult<()> {
    cmd.stdin(console_stdio(binding.fd)?)
        .stdout(console_stdio(binding.fd)?)
        .stderr(console_stdio(binding.fd)?);
    if binding.controlling_tty {
        // SAFETY: only async-signal-safe calls run between fork and exec.
        // `pre_exec` runs after stdio has been rebound, so fd 0 is the console.
        unsafe {
            cmd.pre_exec(|| {
                // Failures only cost job control; the shell still runs.
                libc::setsid();
                libc::ioctl(libc::STDIN_FILENO, libc::TIOCSCTTY, 1);
                Ok(())
            });
        }
    }
    Ok(())
}

impl Launcher for SystemLauncher {
    fn launch(&mut self, program: &Program, completion: Completion) -> LaunchResult<Launched> {
        let mut cmd = self.command(program)?;
        let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            path: program.path.clone(),
            source,
        })?;
        debug!(
            "[launch] {} pid {} ({:?})",
            program.path.display(),
            child.id(),
            completion
        );
        match completion {
            Completion::Detach => Ok(Launched::Running(child.id())),
            Completion::Wait => child
                .wait()
                .map(Launched::Exited)
                .map_err(|source| LaunchError::Wait {
                    path: program.path.clone(),
                    source,
                }),
        }
    }

    fn set_search_path(&mut self, path: &str) {
        self.search_path = Some(path.to_string());
    }
}
