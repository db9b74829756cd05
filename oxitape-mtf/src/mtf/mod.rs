//! Microsoft Tape Format reader.
//!
//! An MTF tape is a sequence of descriptor blocks, each followed by its
//! streams:
//!
//! ```text
//! TAPE [streams] <filemark>
//! SSET [streams] {VOLB | DIRB | FILE | CFIL | ESPB [streams]}* <filemark>
//! ESET [streams] <filemark>
//! SSET ...                                       (next data set)
//! ```
//!
//! [`MtfReader`] drives that state machine over a [`BlockSource`]. It hands
//! file payloads and directory requests to a [`Destination`] and reports
//! every entry it sees in a [`ReadSummary`].
//!
//! # Example
//!
//! ```no_run
//! use oxitape_core::NullDestination;
//! use oxitape_mtf::mtf::{MtfReader, ReadOptions};
//! use oxitape_mtf::source::RawDevice;
//! use std::fs::File;
//!
//! let source = RawDevice::new(File::open("backup.tap")?);
//! let mut reader = MtfReader::new(source, ReadOptions::new().list_only(true));
//! let summary = reader.read_tape(&mut NullDestination)?;
//! for entry in &summary.entries {
//!     println!("{}", entry);
//! }
//! # Ok::<(), oxitape_core::MtfError>(())
//! ```

pub mod block;
pub mod decode;
pub mod descriptor;
pub mod layout;
pub mod stream;
pub mod window;

pub use block::{Advance, BlockReader};
pub use decode::MtfDateTime;
pub use descriptor::Descriptor;
pub use window::Window;

use crate::source::BlockSource;
use decode::resolve_string;
use layout::{
    DIRB_CORRUPT, DIRB_PATH_IN_STREAM, DescriptorHeader, DirbBody, EsetBody, FILE_CORRUPT,
    FILE_NAME_IN_STREAM, FileBody, Layout, SsetBody, TapeBody, tag_name,
};
use oxitape_core::checksum;
use oxitape_core::entry::sanitize_path;
use oxitape_core::error::{MtfError, Result};
use oxitape_core::{CaseFolding, Destination, Entry, FileAttributes, PathFilter};
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;
use stream::{StanSink, StreamWalker};

/// Compare a header's stored checksum against the XOR of its covered words.
pub(crate) fn verify_checksum(what: &str, raw: &[u8], covered: usize) -> Result<()> {
    match checksum::verify_header(raw, covered) {
        Some((stored, computed)) if stored != computed => {
            Err(MtfError::checksum_mismatch(what, stored, computed))
        }
        Some(_) => Ok(()),
        None => Err(MtfError::out_of_range(covered, 2, raw.len())),
    }
}

/// Options for reading a tape.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Walk the tape without writing anything.
    pub list_only: bool,
    /// Physical block size; detected from the first read when `None`.
    pub block_size: Option<usize>,
    /// Case folding applied to every path read from tape.
    pub case_folding: CaseFolding,
    /// Read only this data set (1-based); all sets when `None`.
    pub data_set: Option<u16>,
    /// Verify descriptor and stream header checksums.
    pub verify_checksums: bool,
    /// Write the window to this file after every refill.
    pub dump_last_block: Option<PathBuf>,
}

impl ReadOptions {
    /// Default options: extract every data set, detect the block size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set list mode.
    pub fn list_only(mut self, list_only: bool) -> Self {
        self.list_only = list_only;
        self
    }

    /// Override the physical block size.
    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = Some(size);
        self
    }

    /// Set the case folding policy.
    pub fn case_folding(mut self, folding: CaseFolding) -> Self {
        self.case_folding = folding;
        self
    }

    /// Read only data set `number`.
    pub fn data_set(mut self, number: u16) -> Self {
        self.data_set = Some(number);
        self
    }

    /// Enable header checksum verification.
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Dump every refilled window to `path`.
    pub fn dump_last_block(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_last_block = Some(path.into());
        self
    }
}

/// Media information from the TAPE block.
#[derive(Debug, Clone, Default)]
pub struct MediaInfo {
    /// Media name.
    pub name: String,
    /// Media description.
    pub description: String,
    /// Name of the software that wrote the tape.
    pub software: String,
    /// Media family id.
    pub family_id: u32,
    /// Sequence number within the family.
    pub sequence: u16,
    /// MTF major version.
    pub major_version: u8,
    /// Format logical block size.
    pub logical_block_size: usize,
    /// Physical block size in use.
    pub physical_block_size: usize,
    /// Media date.
    pub date: MtfDateTime,
}

/// Data set information from the SSET and ESET blocks.
#[derive(Debug, Clone, Default)]
pub struct DataSetInfo {
    /// Data set number.
    pub number: u16,
    /// Data set name.
    pub name: String,
    /// Data set description.
    pub description: String,
    /// User that made the backup.
    pub user: String,
    /// Whether the set's streams may be compressed.
    pub compression: bool,
    /// Media write date.
    pub write_date: MtfDateTime,
    /// Corrupt file count from the ESET block.
    pub corrupt_files: u32,
}

/// Everything seen while reading.
#[derive(Debug, Clone, Default)]
pub struct ReadSummary {
    /// TAPE block information, once the media is open.
    pub tape: Option<MediaInfo>,
    /// Data sets read, in tape order.
    pub data_sets: Vec<DataSetInfo>,
    /// Every file and directory entry read.
    pub entries: Vec<Entry>,
    /// Files listed or extracted.
    pub files: u64,
    /// Directories seen.
    pub directories: u64,
    /// Files rejected by the filter.
    pub skipped: u64,
    /// Files skipped because they were flagged corrupt.
    pub corrupt: u64,
    /// Sum of the displayable sizes of listed or extracted files.
    pub bytes: u64,
}

/// Protocol position between data sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Start,
    Tape,
    InSet,
    SetEnded,
}

/// Reads an MTF tape from a [`BlockSource`].
pub struct MtfReader<S> {
    blocks: BlockReader<S>,
    options: ReadOptions,
    filter: Option<Box<dyn PathFilter>>,
    on_entry: Option<Box<dyn FnMut(&Entry)>>,
    position: Position,
    current_dir: String,
    data_set: u16,
    summary: ReadSummary,
}

impl<S: BlockSource> MtfReader<S> {
    /// Create a reader positioned before the TAPE block.
    pub fn new(source: S, options: ReadOptions) -> Self {
        let mut blocks = BlockReader::new(source, options.block_size);
        if let Some(path) = &options.dump_last_block {
            blocks.dump_each_block(path.clone());
        }

        Self {
            blocks,
            options,
            filter: None,
            on_entry: None,
            position: Position::Start,
            current_dir: String::new(),
            data_set: 0,
            summary: ReadSummary::default(),
        }
    }

    /// Only read files whose folded path matches `filter`.
    pub fn with_filter(mut self, filter: impl PathFilter + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Call `callback` for every entry as it is read.
    pub fn on_entry(mut self, callback: impl FnMut(&Entry) + 'static) -> Self {
        self.on_entry = Some(Box::new(callback));
        self
    }

    /// The options this reader was built with.
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// What has been read so far.
    pub fn summary(&self) -> &ReadSummary {
        &self.summary
    }

    /// Consume the reader, keeping the summary.
    pub fn into_summary(self) -> ReadSummary {
        self.summary
    }

    /// The raw window, for dumping after an error.
    pub fn window(&self) -> &Window {
        self.blocks.window()
    }

    /// Number of logical block refills so far.
    pub fn block_count(&self) -> u64 {
        self.blocks.block_count()
    }

    /// Read the whole tape (or the selected data set) into `dest`.
    pub fn read_tape<D: Destination>(&mut self, dest: &mut D) -> Result<&ReadSummary> {
        let mut more = self.open_media()?;

        while more {
            more = self.read_data_set(dest)?;
            if self.options.data_set.is_some() {
                break;
            }
        }

        log::info!(
            "Read {} files in {} data sets ({} blocks)",
            self.summary.files,
            self.summary.data_sets.len(),
            self.blocks.block_count()
        );
        Ok(&self.summary)
    }

    /// Read the TAPE block and position the window at the first block of the
    /// first (or selected) data set.
    ///
    /// Returns `false` when the tape holds no data set.
    pub fn open_media(&mut self) -> Result<bool> {
        self.blocks.clear_filemark();
        if self.blocks.advance(0)? == Advance::Filemark {
            return Err(MtfError::unexpected_block("TAPE", "filemark"));
        }

        let (header, descriptor) = self.read_descriptor()?;
        let Descriptor::Tape(tape) = descriptor else {
            return Err(MtfError::unexpected_block(
                "TAPE",
                tag_name(&header.block_type),
            ));
        };

        if tape.major_version != 1 {
            return Err(MtfError::UnexpectedVersion {
                version: tape.major_version,
            });
        }
        if tape.logical_block_size == 0 {
            return Err(MtfError::unsupported("zero format logical block size"));
        }

        let flb = tape.logical_block_size as usize;
        self.blocks.set_logical_block_size(flb);
        self.summary.tape = Some(self.media_info(&header, &tape));
        self.blocks.fill_logical_block()?;

        self.finish_descriptor(&header)?;
        self.drain_to_filemark()?;
        self.blocks.clear_filemark();
        self.position = Position::Tape;

        if let Some(number) = self.options.data_set.filter(|&n| n > 1) {
            let marks = usize::from(number - 1) * 2;
            log::info!("Skipping to data set {} ({} filemarks)", number, marks);
            self.blocks.skip_filemarks(marks)?;
        }

        Ok(self.blocks.advance(0)? == Advance::Ready)
    }

    /// Read one data set, starting at its SSET block.
    ///
    /// Returns `true` when another data set follows.
    pub fn read_data_set<D: Destination>(&mut self, dest: &mut D) -> Result<bool> {
        let (header, descriptor) = self.read_descriptor()?;
        let sset = match descriptor {
            Descriptor::Sset(sset) => sset,
            Descriptor::Eotm(_) | Descriptor::Sfmb(_) => {
                return Err(end_of_media(&header));
            }
            _ => {
                return Err(MtfError::unexpected_block(
                    "SSET",
                    tag_name(&header.block_type),
                ));
            }
        };

        self.begin_set(&header, &sset)?;
        self.finish_descriptor(&header)?;

        let mut set_ended = false;
        while !self.blocks.at_filemark() {
            let (header, descriptor) = self.read_descriptor()?;
            match descriptor {
                Descriptor::Volb(_) | Descriptor::Cfil(_) | Descriptor::Espb => {
                    self.finish_descriptor(&header)?;
                }
                Descriptor::Dirb(dirb) => self.read_dirb(&header, &dirb, dest)?,
                Descriptor::File(file) => self.read_file(&header, &file, dest)?,
                Descriptor::Eset(eset) => {
                    self.end_set(&header, &eset)?;
                    set_ended = true;
                }
                Descriptor::Eotm(_) | Descriptor::Sfmb(_) => return Err(end_of_media(&header)),
                Descriptor::Tape(_) | Descriptor::Sset(_) => {
                    return Err(MtfError::unexpected_block(
                        "data set body",
                        tag_name(&header.block_type),
                    ));
                }
                Descriptor::Unknown(tag) => {
                    log::warn!("Skipping unknown {} block", tag_name(&tag));
                    let flb = self.blocks.logical_block_size();
                    self.blocks.advance(flb)?;
                }
            }
        }
        self.blocks.clear_filemark();

        if !set_ended {
            if self.blocks.advance(0)? == Advance::Filemark {
                return Err(MtfError::unexpected_block("ESET", "filemark"));
            }
            let (header, descriptor) = self.read_descriptor()?;
            let Descriptor::Eset(eset) = descriptor else {
                return Err(MtfError::unexpected_block(
                    "ESET",
                    tag_name(&header.block_type),
                ));
            };
            self.end_set(&header, &eset)?;
            self.blocks.clear_filemark();
        }

        Ok(self.blocks.advance(0)? == Advance::Ready)
    }

    fn read_descriptor(&mut self) -> Result<(DescriptorHeader, Descriptor)> {
        let window = self.blocks.window();
        let header: DescriptorHeader = window.read(0)?;
        let descriptor = Descriptor::parse(&header, window)?;

        if descriptor.is_known() {
            if self.options.verify_checksums {
                verify_checksum(
                    "descriptor header",
                    window.view(0, DescriptorHeader::SIZE)?,
                    DescriptorHeader::CHECKSUMMED,
                )?;
            }
            log::info!("{} block", tag_name(&header.block_type));
            descriptor.log_fields(&header, window.bytes());
        }

        Ok((header, descriptor))
    }

    fn string(&self, header: &DescriptorHeader, address: layout::TapeAddress) -> Result<String> {
        resolve_string(header.string_type, self.blocks.window().bytes(), address)
    }

    fn media_info(&self, header: &DescriptorHeader, tape: &TapeBody) -> MediaInfo {
        MediaInfo {
            name: self.string(header, tape.name).unwrap_or_default(),
            description: self.string(header, tape.description).unwrap_or_default(),
            software: self.string(header, tape.software).unwrap_or_default(),
            family_id: tape.family_id,
            sequence: tape.sequence,
            major_version: tape.major_version,
            logical_block_size: tape.logical_block_size as usize,
            physical_block_size: self.blocks.physical_block_size().unwrap_or_default(),
            date: tape.date,
        }
    }

    fn begin_set(&mut self, header: &DescriptorHeader, sset: &SsetBody) -> Result<()> {
        match self.position {
            Position::Tape | Position::SetEnded => {}
            Position::Start => return Err(MtfError::unexpected_block("TAPE", "SSET")),
            Position::InSet => return Err(MtfError::unexpected_block("ESET", "SSET")),
        }

        let info = DataSetInfo {
            number: sset.number,
            name: self.string(header, sset.name)?,
            description: self.string(header, sset.description)?,
            user: self.string(header, sset.user)?,
            compression: header.compression_allowed(),
            write_date: sset.write_date,
            corrupt_files: 0,
        };
        log::info!("Data set {}: {}", info.number, info.name);

        self.data_set = sset.number;
        self.current_dir.clear();
        self.summary.data_sets.push(info);
        self.position = Position::InSet;
        Ok(())
    }

    fn end_set(&mut self, header: &DescriptorHeader, eset: &EsetBody) -> Result<()> {
        if self.position != Position::InSet {
            return Err(MtfError::unexpected_block("SSET", "ESET"));
        }
        if let Some(info) = self.summary.data_sets.last_mut() {
            info.corrupt_files = eset.corrupt_count;
        }
        if eset.corrupt_count > 0 {
            log::warn!(
                "Data set {} reports {} corrupt files",
                eset.number,
                eset.corrupt_count
            );
        }

        self.finish_descriptor(header)?;
        self.drain_to_filemark()?;
        self.position = Position::SetEnded;
        Ok(())
    }

    fn read_dirb<D: Destination>(
        &mut self,
        header: &DescriptorHeader,
        dirb: &DirbBody,
        dest: &mut D,
    ) -> Result<()> {
        if dirb.attributes & DIRB_PATH_IN_STREAM != 0 {
            return Err(MtfError::unsupported("directory names stored in streams"));
        }

        let name = self.string(header, dirb.name)?;
        self.current_dir = self.options.case_folding.apply(&name);
        log::info!("Directory: {}", self.current_dir);

        let mut entry = self.stamp(
            Entry::directory(self.current_dir.clone()),
            header,
            &dirb.modified,
            &dirb.created,
            &dirb.accessed,
            dirb.attributes,
        );
        entry.corrupt = dirb.attributes & DIRB_CORRUPT != 0;

        if !self.options.list_only && self.filter.is_none() {
            let relative = sanitize_path(&self.current_dir);
            if !relative.is_empty() {
                dest.create_dir(&relative)?;
            }
        }

        self.summary.directories += 1;
        self.record(entry);
        self.finish_descriptor(header)
    }

    fn read_file<D: Destination>(
        &mut self,
        header: &DescriptorHeader,
        file: &FileBody,
        dest: &mut D,
    ) -> Result<()> {
        if file.attributes & FILE_CORRUPT != 0 {
            log::warn!(
                "Skipping corrupt file at logical address {}",
                header.logical_address
            );
            self.summary.corrupt += 1;
            return self.finish_descriptor(header);
        }
        if file.attributes & FILE_NAME_IN_STREAM != 0 {
            return Err(MtfError::unsupported("file names stored in streams"));
        }

        let name = self.string(header, file.name)?;
        let path = self
            .options
            .case_folding
            .apply(&join_path(&self.current_dir, &name));

        if let Some(filter) = &self.filter {
            if !filter.matches(&path) {
                log::debug!("Skipping {}", path);
                self.summary.skipped += 1;
                return self.finish_descriptor(header);
            }
        }

        let entry = self.stamp(
            Entry::file(path.clone(), header.displayable_size),
            header,
            &file.modified,
            &file.created,
            &file.accessed,
            file.attributes,
        );

        if self.options.list_only {
            self.finish_descriptor(header)?;
        } else {
            let relative = sanitize_path(&path);
            if relative.is_empty() {
                return Err(MtfError::path_traversal(path));
            }

            log::info!("Extracting {}", relative);
            let mut writer = dest.create_file(&relative)?;
            let sink = StanSink {
                writer: &mut writer,
                path: &relative,
                compression_allowed: header.compression_allowed(),
            };
            self.finish_descriptor_with(header, Some(sink))?;
            dest.finish_file(&relative, writer, &entry)?;
        }

        self.summary.files += 1;
        self.summary.bytes += entry.size;
        self.record(entry);
        Ok(())
    }

    fn stamp(
        &self,
        entry: Entry,
        header: &DescriptorHeader,
        modified: &MtfDateTime,
        created: &MtfDateTime,
        accessed: &MtfDateTime,
        attributes: u32,
    ) -> Entry {
        let time = |date: &MtfDateTime, what: &str| -> Option<SystemTime> {
            if date.is_unset() {
                return None;
            }
            let time = date.to_system_time();
            if time.is_none() {
                log::warn!("Invalid {} date {} on {}", what, date, entry.name);
            }
            time
        };

        let modified = time(modified, "modification");
        let created = time(created, "creation");
        let accessed = time(accessed, "access");

        Entry {
            modified,
            created,
            accessed,
            attributes: FileAttributes::from_mtf(attributes),
            data_set: self.data_set,
            offset: header.logical_address,
            ..entry
        }
    }

    fn record(&mut self, entry: Entry) {
        if let Some(callback) = &mut self.on_entry {
            callback(&entry);
        }
        self.summary.entries.push(entry);
    }

    fn finish_descriptor(&mut self, header: &DescriptorHeader) -> Result<()> {
        self.finish_descriptor_with::<std::io::Sink>(header, None)
    }

    /// Walk the descriptor's streams, leaving the window at the next
    /// descriptor or at a filemark.
    fn finish_descriptor_with<W: Write>(
        &mut self,
        header: &DescriptorHeader,
        stan: Option<StanSink<'_, W>>,
    ) -> Result<()> {
        let first = header.first_stream as usize;
        if first < DescriptorHeader::SIZE {
            return Err(MtfError::bad_stream_offset(
                tag_name(&header.block_type),
                header.first_stream,
            ));
        }

        if first < self.blocks.logical_block_size() {
            StreamWalker::new(&mut self.blocks, self.options.verify_checksums)
                .walk_streams(first, stan)
        } else {
            self.blocks.advance(first)?;
            Ok(())
        }
    }

    fn drain_to_filemark(&mut self) -> Result<()> {
        while !self.blocks.at_filemark() {
            self.blocks.advance(0)?;
        }
        Ok(())
    }
}

fn end_of_media(header: &DescriptorHeader) -> MtfError {
    MtfError::unsupported(format!(
        "{} block (multi-volume and soft filemark tapes)",
        tag_name(&header.block_type)
    ))
}

/// Join a directory path read from a DIRB block and a file name.
fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() || dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}
