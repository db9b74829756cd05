//! Extract command implementation.

use crate::utils::{PatternFilter, create_spinner, open_source, run_reader};
use oxitape_mtf::TapeFormat;
use oxitape_mtf::fs::FsDestination;
use oxitape_mtf::mtf::{MtfReader, ReadOptions};
use std::path::Path;

/// Options for extracting tape contents.
pub struct ExtractOptions<'a> {
    pub output: &'a Path,
    pub patterns: &'a [String],
    pub progress: bool,
    pub preserve_times: bool,
    pub format: Option<TapeFormat>,
    pub read: ReadOptions,
}

pub fn cmd_extract(tape: &Path, options: ExtractOptions) -> Result<(), Box<dyn std::error::Error>> {
    let source = open_source(tape, options.format)?;
    let mut dest = FsDestination::new(options.output)?.preserve_times(options.preserve_times);

    let mut reader = MtfReader::new(source, options.read.list_only(false));
    if let Some(filter) = PatternFilter::new(options.patterns)? {
        reader = reader.with_filter(filter);
    }

    println!("Extracting {} to {}", tape.display(), options.output.display());

    let pb = create_spinner(options.progress);
    let bar = pb.clone();
    reader = reader.on_entry(move |entry| {
        bar.inc(1);
        bar.set_message(entry.name.clone());
    });

    let result = run_reader(&mut reader, &mut dest);
    pb.finish_and_clear();
    result?;

    let summary = reader.summary();
    println!(
        "Extracted {} files ({} bytes) from {} data sets",
        summary.files,
        summary.bytes,
        summary.data_sets.len()
    );
    if summary.skipped > 0 {
        println!("  Skipped: {} files not matching the patterns", summary.skipped);
    }
    if summary.corrupt > 0 {
        println!("  Corrupt: {} files not restored", summary.corrupt);
    }

    Ok(())
}
