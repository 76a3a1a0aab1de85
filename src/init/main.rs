// CLASSIFICATION: COMMUNITY
// Filename: main.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! PID 1 of the ramdisk image.
//!
//! Boots into the labelled root partition, then serves the two consoles.
//! Kernel command-line leftovers passed as arguments are ignored.

use std::process::exit;

use env_logger::Env;
use log::{error, info, warn};

use rdinit::boot::{install_symlinks, BootSequence, LinuxHost, StepOutcome};
use rdinit::config::BootConfig;
use rdinit::console::{open_consoles, wait_for_executable, Multiplexer};
use rdinit::process::{Launcher, SystemLauncher};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("[init] starting");

    let config = BootConfig::load();
    let mut host = LinuxHost;
    let mut launcher = SystemLauncher::new();

    let report = BootSequence::new(&config, &mut host, &mut launcher).run();
    match &report.aborted {
        Some(e) => info!("[init] boot stopped early ({e}); staying on the ramdisk root"),
        None => info!("[init] boot sequence complete"),
    }

    // Runs whether or not the root switch happened, so the ramdisk gets its
    // applet links too.
    match install_symlinks(&config.shell, &host, &mut launcher) {
        StepOutcome::Failed(why) => error!("[init] symlink install: {why}"),
        outcome => info!("[init] symlink install: {outcome:?}"),
    }
    launcher.set_search_path(&config.shell.path);

    let consoles = match open_consoles(&config.consoles) {
        Ok(c) => c,
        Err(e) => {
            error!("[init] {e}");
            exit(1);
        }
    };

    let trigger = config.trigger_bytes().unwrap_or_else(|| {
        warn!(
            "[init] trigger {:?} is not two ASCII characters; using \"sh\"",
            config.consoles.trigger
        );
        *b"sh"
    });

    let interval = config.shell.poll_interval();
    wait_for_executable(&config.shell.binary, interval);
    info!(
        "[init] consoles ready; type {:?} for a shell",
        String::from_utf8_lossy(&trigger)
    );
    Multiplexer::new(consoles, trigger, config.shell.binary.clone(), launcher).run(interval)
}
