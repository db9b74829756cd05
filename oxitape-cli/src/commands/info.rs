//! Info command implementation.

use crate::utils::{open_source, run_reader};
use oxitape_core::NullDestination;
use oxitape_mtf::TapeFormat;
use oxitape_mtf::mtf::{MtfReader, ReadOptions};
use std::path::Path;

pub fn cmd_info(
    tape: &Path,
    format: Option<TapeFormat>,
    options: ReadOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = open_source(tape, format)?;
    let mut reader = MtfReader::new(source, options.list_only(true));
    run_reader(&mut reader, &mut NullDestination)?;
    let summary = reader.summary();

    println!("Tape Information");
    println!("================");
    println!("Source: {}", tape.display());

    if let Some(media) = &summary.tape {
        println!();
        println!("Media:");
        println!("  Name: {}", media.name);
        if !media.description.is_empty() {
            println!("  Description: {}", media.description);
        }
        println!("  Software: {}", media.software);
        println!("  Family ID: {:08X}", media.family_id);
        println!("  Sequence: {}", media.sequence);
        println!("  MTF version: {}", media.major_version);
        println!("  Logical block size: {} bytes", media.logical_block_size);
        println!("  Physical block size: {} bytes", media.physical_block_size);
        println!("  Date: {}", media.date);
    }

    for set in &summary.data_sets {
        let entries = summary.entries.iter().filter(|e| e.data_set == set.number);
        let (files, size) = entries
            .filter(|e| e.is_file())
            .fold((0u64, 0u64), |(n, bytes), e| (n + 1, bytes + e.size));

        println!();
        println!("Data set {}:", set.number);
        println!("  Name: {}", set.name);
        if !set.description.is_empty() {
            println!("  Description: {}", set.description);
        }
        println!("  User: {}", set.user);
        println!("  Written: {}", set.write_date);
        println!("  Compression: {}", if set.compression { "allowed" } else { "off" });
        println!("  Files: {}", files);
        println!("  Total size: {} bytes", size);
        if set.corrupt_files > 0 {
            println!("  Corrupt files: {}", set.corrupt_files);
        }
    }

    println!();
    println!("Contents:");
    println!("  Files: {}", summary.files);
    println!("  Directories: {}", summary.directories);
    println!("  Total size: {} bytes", summary.bytes);
    println!("  Blocks read: {}", reader.block_count());

    Ok(())
}
