//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use oxitape_core::error::MtfError;
use oxitape_core::{Destination, PathFilter};
use oxitape_mtf::TapeFormat;
use oxitape_mtf::mtf::MtfReader;
use oxitape_mtf::source::{BlockSource, RawDevice, SimhTape};
use regex::{RegexSet, RegexSetBuilder};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

/// Most patterns accepted on one command line.
pub const MAX_PATTERNS: usize = 20;

/// File written with the raw window when a read fails.
pub const ERROR_BLOCK_DUMP: &str = "errorblock.dmp";

/// A block source opened from a path.
pub type TapeSource = Box<dyn BlockSource>;

/// Matches paths against any of a set of regular expressions.
///
/// Patterns are case-insensitive and `.` matches every character.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    set: RegexSet,
}

impl PatternFilter {
    /// Compile `patterns`; `None` when there are none.
    pub fn new(patterns: &[String]) -> Result<Option<Self>, MtfError> {
        if patterns.is_empty() {
            return Ok(None);
        }
        if patterns.len() > MAX_PATTERNS {
            return Err(MtfError::invalid_pattern(
                &patterns[MAX_PATTERNS],
                format!("at most {} patterns are allowed", MAX_PATTERNS),
            ));
        }

        // Compile one at a time so the error names the bad pattern.
        for pattern in patterns {
            RegexSetBuilder::new([pattern])
                .case_insensitive(true)
                .dot_matches_new_line(true)
                .build()
                .map_err(|e| MtfError::invalid_pattern(pattern, e.to_string()))?;
        }

        let set = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| MtfError::invalid_pattern(patterns.join(" "), e.to_string()))?;
        Ok(Some(Self { set }))
    }
}

impl PathFilter for PatternFilter {
    fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }
}

/// Open a tape device or image.
///
/// Regular files are sniffed unless `format` is given; devices are always
/// read raw, since sniffing would consume their first block.
pub fn open_source(path: &Path, format: Option<TapeFormat>) -> Result<TapeSource, MtfError> {
    let mut file = File::open(path)?;
    let is_file = file.metadata()?.is_file();

    let format = match format {
        Some(format) => format,
        None if is_file => {
            let (format, _) = TapeFormat::detect(&mut file)?;
            file.seek(SeekFrom::Start(0))?;
            format
        }
        None => TapeFormat::Mtf,
    };

    log::debug!("Reading {} as {}", path.display(), format);

    Ok(match format {
        TapeFormat::Simh => Box::new(SimhTape::new(BufReader::new(file))),
        TapeFormat::Mtf | TapeFormat::Unknown => Box::new(RawDevice::new(file)),
    })
}

/// Read the whole tape, dumping the window to [`ERROR_BLOCK_DUMP`] and
/// naming the failing stage on error.
pub fn run_reader<D: Destination>(
    reader: &mut MtfReader<TapeSource>,
    dest: &mut D,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = reader.read_tape(dest).map(|_| ());

    if let Err(e) = result {
        if let Err(dump) = std::fs::write(ERROR_BLOCK_DUMP, reader.window().bytes()) {
            log::warn!("Unable to write {}: {}", ERROR_BLOCK_DUMP, dump);
        }

        let summary = reader.summary();
        let stage = match (&summary.tape, summary.data_sets.last()) {
            (None, _) => "opening media".to_string(),
            (Some(_), None) => "locating the first data set".to_string(),
            (Some(_), Some(set)) => format!("reading data set {}", set.number),
        };
        let blocks = reader.block_count();
        return Err(format!("{} failed after {} blocks: {}", stage, blocks, e).into());
    }

    Ok(())
}

/// Create a spinner counting entries, or a hidden bar.
pub fn create_spinner(enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} [{elapsed_precise}] {pos} entries {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}
