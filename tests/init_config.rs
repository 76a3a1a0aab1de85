// CLASSIFICATION: COMMUNITY
// Filename: init_config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use rdinit::config::BootConfig;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
#[serial]
fn load_reads_override_path() {
    let dir = tempdir().unwrap();
    let conf = dir.path().join("init.conf");
    fs::write(
        &conf,
        "[esp]\nlabel = \"EFI\"\n[shell]\npath = \"/sbin:/bin\"\npoll_interval_secs = 2\n",
    )
    .unwrap();
    std::env::set_var("RDINIT_CONF", &conf);
    let cfg = BootConfig::load();
    std::env::remove_var("RDINIT_CONF");
    assert_eq!(cfg.esp.label, "EFI");
    assert_eq!(cfg.esp.fstype, "vfat");
    assert_eq!(cfg.shell.path, "/sbin:/bin");
    assert_eq!(cfg.shell.poll_interval().as_secs(), 2);
    assert_eq!(cfg.shell.binary, PathBuf::from("/bin/busybox"));
}

#[test]
#[serial]
fn missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    std::env::set_var("RDINIT_CONF", dir.path().join("absent.conf"));
    let cfg = BootConfig::load();
    std::env::remove_var("RDINIT_CONF");
    assert_eq!(cfg, BootConfig::default());
}

#[test]
#[serial]
fn malformed_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let conf = dir.path().join("init.conf");
    fs::write(&conf, "[consoles\nprimary = 3").unwrap();
    std::env::set_var("RDINIT_CONF", &conf);
    let cfg = BootConfig::load();
    std::env::remove_var("RDINIT_CONF");
    assert_eq!(cfg, BootConfig::default());
}

#[test]
fn zero_interval_is_clamped() {
    let mut cfg = BootConfig::default();
    cfg.shell.poll_interval_secs = 0;
    assert_eq!(cfg.shell.poll_interval().as_secs(), 1);
}
