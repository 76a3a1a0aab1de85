// CLASSIFICATION: COMMUNITY
// Filename: gptlabel.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Inspect the partition entry array the way init reads it.

use std::path::{Path, PathBuf};
use std::process::exit;

use clap::Parser;
use rdinit::config::BootConfig;
use rdinit::disk::gpt::{list_entries, resolve_label, Lookup, VolumeLabel};

#[derive(Parser, Debug)]
#[command(name = "gptlabel", about = "Resolve GPT partition labels", version = "0.1")]
struct Cli {
    /// Whole-disk device or image file (defaults to the configured boot disk)
    #[arg(long, short)]
    device: Option<PathBuf>,

    /// List used entries with their names and LBA ranges
    #[arg(long, conflicts_with = "label")]
    list: bool,

    /// Print the partition device carrying LABEL
    #[arg(required_unless_present = "list")]
    label: Option<String>,
}

fn find(config: &BootConfig, label: &str) {
    let device = &config.disk.device;
    match resolve_label(device, &VolumeLabel::new(label)) {
        Ok(Lookup::Found(index)) => {
            println!("{} (index {index})", config.partition_device(index).display());
        }
        Ok(Lookup::NotFound) => {
            eprintln!("{label}: not found on {}", device.display());
            exit(1);
        }
        Ok(Lookup::Truncated { scanned }) => {
            eprintln!(
                "{label}: not found; entry array on {} ends after {scanned} entries",
                device.display()
            );
            exit(1);
        }
        Err(e) => {
            eprintln!("gptlabel: {e}");
            exit(2);
        }
    }
}

fn list(device: &Path) {
    match list_entries(device) {
        Ok(scan) => {
            for (index, entry) in scan.entries.iter().filter(|(_, e)| e.is_used()) {
                println!(
                    "{index:3}  {:>12}..{:<12}  {}",
                    entry.first_lba, entry.last_lba, entry.name
                );
            }
            if scan.truncated {
                eprintln!("(entry array truncated after {} entries)", scan.entries.len());
            }
        }
        Err(e) => {
            eprintln!("gptlabel: {e}");
            exit(2);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let mut config = BootConfig::load();
    if let Some(device) = cli.device {
        config.disk.device = device;
    }

    match cli.label {
        Some(label) => find(&config, &label),
        None => list(&config.disk.device),
    }
}
