// CLASSIFICATION: COMMUNITY
// Filename: gpt.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! GPT partition lookup by volume label.
//!
//! Only the partition entry array is read. Its position and geometry are
//! fixed: 512-byte sectors, entries starting at sector 2 (sector 0 holds the
//! protective MBR, sector 1 the table header), 128 entries of 128 bytes. The
//! header is never consulted and no checksum is verified.
//!
//! Lookup policy:
//! * entries with `first_lba == 0` are unused and skipped;
//! * the first matching entry in table order wins, later duplicates are
//!   never reported;
//! * a short or failed read ends the scan and is reported as
//!   [`Lookup::Truncated`], separate from a clean [`Lookup::NotFound`].

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

pub const SECTOR_SIZE: u64 = 512;
/// Byte offset of the partition entry array.
pub const ENTRY_ARRAY_OFFSET: u64 = 2 * SECTOR_SIZE;
pub const ENTRY_SIZE: usize = 128;
pub const MAX_ENTRIES: u32 = 128;
/// Length of a partition name in UTF-16 code units.
pub const NAME_UNITS: usize = 36;

/// Errors that prevent the entry array from being read at all.
#[derive(Debug, Error)]
pub enum GptError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot seek to partition entry array: {0}")]
    Seek(#[source] io::Error),
}

pub type GptResult<T> = Result<T, GptError>;

/// Outcome of a label scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// 1-based position of the first used entry carrying the label.
    Found(u32),
    /// All entries were read and none matched.
    NotFound,
    /// The array ended early; `scanned` entries were read before the short read.
    Truncated { scanned: u32 },
}

impl Lookup {
    pub fn index(self) -> Option<u32> {
        match self {
            Lookup::Found(i) => Some(i),
            _ => None,
        }
    }
}

/// A UTF-16 partition name as stored in the entry array.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VolumeLabel([u16; NAME_UNITS]);

impl VolumeLabel {
    /// Encode `name` as UTF-16, truncated to 36 units and NUL padded.
    pub fn new(name: &str) -> Self {
        let mut units = [0u16; NAME_UNITS];
        for (slot, unit) in units.iter_mut().zip(name.encode_utf16()) {
            *slot = unit;
        }
        Self(units)
    }

    pub fn from_units(units: [u16; NAME_UNITS]) -> Self {
        Self(units)
    }

    pub fn units(&self) -> &[u16; NAME_UNITS] {
        &self.0
    }

    /// Label equality: compare unit by unit, stopping at the first NUL in
    /// either operand. A NUL in only one operand is a mismatch at that unit.
    pub fn matches(&self, other: &VolumeLabel) -> bool {
        for (&a, &b) in self.0.iter().zip(other.0.iter()) {
            if a != b {
                return false;
            }
            if a == 0 {
                break;
            }
        }
        true
    }
}

impl std::fmt::Debug for VolumeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VolumeLabel({:?})", self.to_string())
    }
}

impl std::fmt::Display for VolumeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let end = self.0.iter().position(|&u| u == 0).unwrap_or(NAME_UNITS);
        f.write_str(&String::from_utf16_lossy(&self.0[..end]))
    }
}

/// One decoded 128-byte partition entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionEntry {
    pub type_guid: [u8; 16],
    pub unique_guid: [u8; 16],
    pub first_lba: u64,
    pub last_lba: u64,
    pub attributes: u64,
    pub name: VolumeLabel,
}

impl PartitionEntry {
    /// Decode the little-endian on-disk layout.
    pub fn parse(raw: &[u8; ENTRY_SIZE]) -> Self {
        let mut type_guid = [0u8; 16];
        let mut unique_guid = [0u8; 16];
        type_guid.copy_from_slice(&raw[0..16]);
        unique_guid.copy_from_slice(&raw[16..32]);
        let u64_at = |off: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&raw[off..off + 8]);
            u64::from_le_bytes(b)
        };
        let mut name = [0u16; NAME_UNITS];
        for (i, unit) in name.iter_mut().enumerate() {
            let off = 56 + i * 2;
            *unit = u16::from_le_bytes([raw[off], raw[off + 1]]);
        }
        Self {
            type_guid,
            unique_guid,
            first_lba: u64_at(32),
            last_lba: u64_at(40),
            attributes: u64_at(48),
            name: VolumeLabel(name),
        }
    }

    /// Encode into the on-disk layout. Used to build synthetic tables.
    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut raw = [0u8; ENTRY_SIZE];
        raw[0..16].copy_from_slice(&self.type_guid);
        raw[16..32].copy_from_slice(&self.unique_guid);
        raw[32..40].copy_from_slice(&self.first_lba.to_le_bytes());
        raw[40..48].copy_from_slice(&self.last_lba.to_le_bytes());
        raw[48..56].copy_from_slice(&self.attributes.to_le_bytes());
        for (i, unit) in self.name.0.iter().enumerate() {
            let off = 56 + i * 2;
            raw[off..off + 2].copy_from_slice(&unit.to_le_bytes());
        }
        raw
    }

    pub fn is_used(&self) -> bool {
        self.first_lba != 0
    }
}

/// Result of walking the entry array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryScan {
    /// Entries read, in table order, paired with their 1-based position.
    pub entries: Vec<(u32, PartitionEntry)>,
    /// True when a short read ended the walk before `MAX_ENTRIES`.
    pub truncated: bool,
}

/// Fill `buf` completely or report how much arrived. Interrupted reads retry.
fn read_entry<R: Read>(reader: &mut R, buf: &mut [u8; ENTRY_SIZE]) -> bool {
    let mut filled = 0;
    while filled < ENTRY_SIZE {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return false,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return false,
        }
    }
    true
}

/// Visit entries in table order until `visit` returns true or the array ends.
/// Returns the stopping position, or the scan state if the visitor never stopped.
fn walk_entries<R, F>(reader: &mut R, mut visit: F) -> GptResult<Result<u32, EntryScanEnd>>
where
    R: Read + Seek,
    F: FnMut(u32, &PartitionEntry) -> bool,
{
    reader
        .seek(SeekFrom::Start(ENTRY_ARRAY_OFFSET))
        .map_err(GptError::Seek)?;
    let mut raw = [0u8; ENTRY_SIZE];
    for position in 1..=MAX_ENTRIES {
        if !read_entry(reader, &mut raw) {
            return Ok(Err(EntryScanEnd::Truncated {
                scanned: position - 1,
            }));
        }
        let entry = PartitionEntry::parse(&raw);
        if visit(position, &entry) {
            return Ok(Ok(position));
        }
    }
    Ok(Err(EntryScanEnd::Complete))
}

#[derive(Debug, Clone, Copy)]
enum EntryScanEnd {
    Complete,
    Truncated { scanned: u32 },
}

/// Find `wanted` among the used entries of an entry array reachable through `reader`.
pub fn find_label<R: Read + Seek>(reader: &mut R, wanted: &VolumeLabel) -> GptResult<Lookup> {
    let outcome = walk_entries(reader, |_, entry| {
        entry.is_used() && wanted.matches(&entry.name)
    })?;
    Ok(match outcome {
        Ok(position) => Lookup::Found(position),
        Err(EntryScanEnd::Complete) => Lookup::NotFound,
        Err(EntryScanEnd::Truncated { scanned }) => Lookup::Truncated { scanned },
    })
}

/// Read every entry of the array, used or not.
pub fn scan_entries<R: Read + Seek>(reader: &mut R) -> GptResult<EntryScan> {
    let mut entries = Vec::new();
    let end = walk_entries(reader, |position, entry| {
        entries.push((position, *entry));
        false
    })?;
    Ok(EntryScan {
        entries,
        truncated: matches!(end, Err(EntryScanEnd::Truncated { .. })),
    })
}

fn open_device(device: &Path) -> GptResult<File> {
    File::open(device).map_err(|source| GptError::Open {
        path: device.to_path_buf(),
        source,
    })
}

/// Resolve `wanted` on the block device (or image file) at `device`.
pub fn resolve_label(device: &Path, wanted: &VolumeLabel) -> GptResult<Lookup> {
    let mut file = open_device(device)?;
    let lookup = find_label(&mut file, wanted)?;
    debug!("[gpt] {} label {}: {:?}", device.display(), wanted, lookup);
    Ok(lookup)
}

/// List all entries on `device`.
pub fn list_entries(device: &Path) -> GptResult<EntryScan> {
    let mut file = open_device(device)?;
    scan_entries(&mut file)
}
