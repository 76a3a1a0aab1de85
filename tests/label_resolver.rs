// CLASSIFICATION: COMMUNITY
// Filename: label_resolver.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use rdinit::disk::gpt::{
    list_entries, resolve_label, GptError, Lookup, PartitionEntry, VolumeLabel,
    ENTRY_ARRAY_OFFSET, ENTRY_SIZE, MAX_ENTRIES,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn entry(name: &str, first_lba: u64) -> PartitionEntry {
    PartitionEntry {
        type_guid: [0xaf; 16],
        unique_guid: [0x01; 16],
        first_lba,
        last_lba: if first_lba == 0 { 0 } else { first_lba + 4095 },
        attributes: 0,
        name: VolumeLabel::new(name),
    }
}

/// Protective MBR + header sectors, then `slots` entries (missing ones zeroed).
fn write_image(dir: &Path, entries: &[PartitionEntry], slots: u32) -> PathBuf {
    let mut data = vec![0u8; ENTRY_ARRAY_OFFSET as usize];
    data[510] = 0x55;
    data[511] = 0xaa;
    data[512..520].copy_from_slice(b"EFI PART");
    for i in 0..slots as usize {
        match entries.get(i) {
            Some(e) => data.extend_from_slice(&e.to_bytes()),
            None => data.extend_from_slice(&[0u8; ENTRY_SIZE]),
        }
    }
    let path = dir.join("disk.img");
    fs::write(&path, data).unwrap();
    path
}

#[test]
fn unused_first_entry_is_skipped() {
    let dir = tempdir().unwrap();
    let img = write_image(
        dir.path(),
        &[entry("primary", 0), entry("primary", 100)],
        MAX_ENTRIES,
    );
    let found = resolve_label(&img, &VolumeLabel::new("primary")).unwrap();
    assert_eq!(found, Lookup::Found(2));
}

#[test]
fn single_match_reports_its_position() {
    let dir = tempdir().unwrap();
    let img = write_image(
        dir.path(),
        &[entry("bios", 34), entry("ESP", 2048), entry("primary", 526336)],
        MAX_ENTRIES,
    );
    assert_eq!(
        resolve_label(&img, &VolumeLabel::new("ESP")).unwrap(),
        Lookup::Found(2)
    );
    assert_eq!(
        resolve_label(&img, &VolumeLabel::new("primary")).unwrap(),
        Lookup::Found(3)
    );
}

#[test]
fn no_match_is_not_found() {
    let dir = tempdir().unwrap();
    let img = write_image(dir.path(), &[entry("ESPX", 2048)], MAX_ENTRIES);
    assert_eq!(
        resolve_label(&img, &VolumeLabel::new("ESP")).unwrap(),
        Lookup::NotFound
    );
}

#[test]
fn unused_entry_with_matching_name_is_ignored() {
    let dir = tempdir().unwrap();
    let img = write_image(dir.path(), &[entry("primary", 0)], MAX_ENTRIES);
    assert_eq!(
        resolve_label(&img, &VolumeLabel::new("primary")).unwrap(),
        Lookup::NotFound
    );
}

#[test]
fn truncated_image_is_distinguished() {
    let dir = tempdir().unwrap();
    let img = write_image(dir.path(), &[entry("ESP", 2048)], 4);
    assert_eq!(
        resolve_label(&img, &VolumeLabel::new("primary")).unwrap(),
        Lookup::Truncated { scanned: 4 }
    );
}

#[test]
fn image_shorter_than_headers_is_truncated_at_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tiny.img");
    fs::write(&path, [0u8; 100]).unwrap();
    assert_eq!(
        resolve_label(&path, &VolumeLabel::new("primary")).unwrap(),
        Lookup::Truncated { scanned: 0 }
    );
}

#[test]
fn missing_device_is_an_error_not_a_miss() {
    let dir = tempdir().unwrap();
    let err = resolve_label(&dir.path().join("sda"), &VolumeLabel::new("primary")).unwrap_err();
    assert!(matches!(err, GptError::Open { .. }));
}

#[test]
fn listing_reports_every_slot() {
    let dir = tempdir().unwrap();
    let img = write_image(dir.path(), &[entry("ESP", 2048), entry("", 0)], MAX_ENTRIES);
    let scan = list_entries(&img).unwrap();
    assert!(!scan.truncated);
    assert_eq!(scan.entries.len(), MAX_ENTRIES as usize);
    let used: Vec<_> = scan.entries.iter().filter(|(_, e)| e.is_used()).collect();
    assert_eq!(used.len(), 1);
    assert_eq!(used[0].0, 1);
    assert_eq!(used[0].1.name.to_string(), "ESP");
}
