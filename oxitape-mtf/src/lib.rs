//! # OxiTape MTF
//!
//! Microsoft Tape Format reader for OxiTape.
//!
//! This crate walks MTF backup streams as written by Windows NT Backup and
//! compatible software:
//!
//! - **Block sources**: raw tape devices and image files, and SIMH `.tap`
//!   images that keep filemarks inside a regular file
//! - **Block reassembly**: physical blocks of any size are regrouped into
//!   the format's logical blocks
//! - **Descriptor dispatch**: TAPE, SSET, VOLB, DIRB, FILE, CFIL, ESPB and
//!   ESET blocks are decoded; EOTM and SFMB stop the read
//! - **Stream extraction**: STAN payloads are copied to a
//!   [`Destination`](oxitape_core::Destination), all other streams skipped
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxitape_mtf::fs::FsDestination;
//! use oxitape_mtf::mtf::{MtfReader, ReadOptions};
//! use oxitape_mtf::source::SimhTape;
//! use std::fs::File;
//!
//! let source = SimhTape::new(File::open("backup.tap").unwrap());
//! let mut dest = FsDestination::new("restore").unwrap();
//! let mut reader = MtfReader::new(source, ReadOptions::new())
//!     .with_filter(|path: &str| path.ends_with(".txt"));
//! let summary = reader.read_tape(&mut dest).unwrap();
//! println!("{} files", summary.files);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod detect;
pub mod fs;
pub mod mtf;
pub mod source;

// Re-exports
pub use detect::TapeFormat;
pub use fs::FsDestination;
pub use mtf::{DataSetInfo, MediaInfo, MtfReader, ReadOptions, ReadSummary};
pub use source::{BlockSource, MAX_TAPE_BLOCK_SIZE, MIN_TAPE_BLOCK_SIZE, RawDevice, SimhTape};
