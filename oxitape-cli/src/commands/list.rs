//! List command implementation.

use crate::utils::{PatternFilter, open_source, run_reader};
use oxitape_core::{Entry, NullDestination};
use oxitape_mtf::TapeFormat;
use oxitape_mtf::mtf::{DataSetInfo, MediaInfo, MtfReader, ReadOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// JSON serializable entry data for tape listings.
#[derive(Debug, Serialize, Deserialize)]
struct EntryJson {
    name: String,
    size: u64,
    is_dir: bool,
    data_set: u16,
    attributes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mtime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ctime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    atime: Option<i64>,
    corrupt: bool,
    logical_address: u64,
}

fn unix_seconds(time: Option<SystemTime>) -> Option<i64> {
    time.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
}

impl EntryJson {
    fn from_entry(entry: &Entry) -> Self {
        Self {
            name: entry.name.clone(),
            size: entry.size,
            is_dir: entry.is_dir(),
            data_set: entry.data_set,
            attributes: entry.attributes.flags(),
            mtime: unix_seconds(entry.modified),
            ctime: unix_seconds(entry.created),
            atime: unix_seconds(entry.accessed),
            corrupt: entry.corrupt,
            logical_address: entry.offset,
        }
    }
}

/// Media section of the JSON listing.
#[derive(Debug, Serialize, Deserialize)]
struct MediaJson {
    name: String,
    software: String,
    version: u8,
    logical_block_size: usize,
    physical_block_size: usize,
}

impl MediaJson {
    fn from_media(media: &MediaInfo) -> Self {
        Self {
            name: media.name.clone(),
            software: media.software.clone(),
            version: media.major_version,
            logical_block_size: media.logical_block_size,
            physical_block_size: media.physical_block_size,
        }
    }
}

/// Data set section of the JSON listing.
#[derive(Debug, Serialize, Deserialize)]
struct DataSetJson {
    number: u16,
    name: String,
    description: String,
    user: String,
    written: String,
}

impl DataSetJson {
    fn from_set(set: &DataSetInfo) -> Self {
        Self {
            number: set.number,
            name: set.name.clone(),
            description: set.description.clone(),
            user: set.user.clone(),
            written: set.write_date.to_string(),
        }
    }
}

/// JSON output for a tape listing.
#[derive(Debug, Serialize, Deserialize)]
struct TapeListJson {
    tape: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<MediaJson>,
    data_sets: Vec<DataSetJson>,
    entries: Vec<EntryJson>,
}

/// Options for listing tape contents.
pub struct ListOptions<'a> {
    pub verbose: bool,
    pub json: bool,
    pub patterns: &'a [String],
    pub format: Option<TapeFormat>,
    pub read: ReadOptions,
}

pub fn cmd_list(tape: &Path, options: ListOptions) -> Result<(), Box<dyn std::error::Error>> {
    let source = open_source(tape, options.format)?;
    let mut reader = MtfReader::new(source, options.read.list_only(true));
    if let Some(filter) = PatternFilter::new(options.patterns)? {
        reader = reader.with_filter(filter);
    }

    if options.json {
        run_reader(&mut reader, &mut NullDestination)?;
        let summary = reader.into_summary();

        let output = TapeListJson {
            tape: tape.display().to_string(),
            media: summary.tape.as_ref().map(MediaJson::from_media),
            data_sets: summary.data_sets.iter().map(DataSetJson::from_set).collect(),
            entries: summary.entries.iter().map(EntryJson::from_entry).collect(),
        };

        // Pretty-print JSON output
        let json_output = serde_json::to_string_pretty(&output)?;
        println!("{}", json_output);
        return Ok(());
    }

    println!("Tape: {}", tape.display());
    println!();

    // Entries are printed as they come off the tape.
    let verbose = options.verbose;
    if verbose {
        println!("{:<5} {:>12} {:>5} Name", "Attr", "Size", "Set");
        println!("{}", "-".repeat(60));
    }
    reader = reader.on_entry(move |entry| {
        if verbose {
            println!("{}", entry);
        } else {
            println!("{}", entry.name);
        }
    });

    run_reader(&mut reader, &mut NullDestination)?;
    let summary = reader.summary();

    if verbose {
        println!("{}", "-".repeat(60));
    }
    println!(
        "{} files, {} directories, {} bytes in {} data sets",
        summary.files,
        summary.directories,
        summary.bytes,
        summary.data_sets.len()
    );
    if summary.skipped > 0 {
        println!("{} files did not match the patterns", summary.skipped);
    }
    if summary.corrupt > 0 {
        println!("{} files are marked corrupt", summary.corrupt);
    }

    Ok(())
}
