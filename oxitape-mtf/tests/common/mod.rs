//! Synthetic MTF tape images for integration tests.

#![allow(dead_code)]

use oxitape_core::{Destination, Entry, Result, WordXor};
use oxitape_mtf::mtf::MtfDateTime;
use oxitape_mtf::source::BlockSource;
use std::collections::{BTreeMap, VecDeque};
use std::io;

pub const STRING_UNICODE: u8 = 2;
pub const FILE_CORRUPT: u32 = 0x0004_0000;
pub const FILE_NAME_IN_STREAM: u32 = 0x0002_0000;
pub const STREAM_COMPRESSED: u16 = 0x0010;
pub const ATTR_COMPRESSION: u32 = 0x0000_0004;

/// 2001-09-09 01:46:40 UTC.
pub const BILLENNIUM: MtfDateTime = MtfDateTime {
    year: 2001,
    month: 9,
    day: 9,
    hour: 1,
    minute: 46,
    second: 40,
};

/// A stream to append after a descriptor.
#[derive(Debug, Clone)]
pub struct Stream {
    pub id: [u8; 4],
    pub fs_attributes: u16,
    pub media_attributes: u16,
    pub data: Vec<u8>,
}

impl Stream {
    pub fn new(id: &[u8; 4], data: &[u8]) -> Self {
        Self {
            id: *id,
            fs_attributes: 0,
            media_attributes: 0,
            data: data.to_vec(),
        }
    }

    pub fn stan(data: &[u8]) -> Self {
        Self::new(b"STAN", data)
    }
}

/// One descriptor block under construction.
pub struct Block {
    bytes: Vec<u8>,
    streams: Vec<Stream>,
    displayable_size: u64,
}

impl Block {
    pub fn new(tag: &[u8; 4], body_size: usize) -> Self {
        let mut bytes = vec![0u8; body_size];
        bytes[0..4].copy_from_slice(tag);
        bytes[10] = 14; // Windows NT
        bytes[48] = STRING_UNICODE;
        Self {
            bytes,
            streams: Vec::new(),
            displayable_size: 0,
        }
    }

    pub fn header_attributes(mut self, attributes: u32) -> Self {
        self.bytes[4..8].copy_from_slice(&attributes.to_le_bytes());
        self
    }

    pub fn u8(mut self, at: usize, value: u8) -> Self {
        self.bytes[at] = value;
        self
    }

    pub fn u16(mut self, at: usize, value: u16) -> Self {
        self.bytes[at..at + 2].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(mut self, at: usize, value: u32) -> Self {
        self.bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub fn date(mut self, at: usize, date: MtfDateTime) -> Self {
        self.bytes[at..at + 5].copy_from_slice(&date.pack());
        self
    }

    /// Append `value` as UTF-16LE after the body and point the tape address
    /// at `at` to it. `\0` in `value` is kept as a NUL character.
    pub fn string(mut self, at: usize, value: &str) -> Self {
        let offset = self.bytes.len();
        let encoded: Vec<u8> = value.encode_utf16().flat_map(u16::to_le_bytes).collect();
        self.bytes.extend_from_slice(&encoded);
        self.bytes[at..at + 2].copy_from_slice(&(encoded.len() as u16).to_le_bytes());
        self.bytes[at + 2..at + 4].copy_from_slice(&(offset as u16).to_le_bytes());
        self
    }

    pub fn stream(mut self, stream: Stream) -> Self {
        self.streams.push(stream);
        self
    }

    pub fn displayable_size(mut self, size: u64) -> Self {
        self.displayable_size = size;
        self
    }

    /// Lay out header, streams and closing SPAD, padded to whole logical
    /// blocks.
    pub fn finish(mut self, flb: usize, logical_address: u64) -> Vec<u8> {
        let first_stream = self.bytes.len().next_multiple_of(4);
        self.bytes[8..10].copy_from_slice(&(first_stream as u16).to_le_bytes());
        self.bytes[12..20].copy_from_slice(&self.displayable_size.to_le_bytes());
        self.bytes[20..28].copy_from_slice(&logical_address.to_le_bytes());
        let sum = WordXor::compute(&self.bytes[..50]);
        self.bytes[50..52].copy_from_slice(&sum.to_le_bytes());

        let mut out = self.bytes;
        out.resize(first_stream, 0);

        for stream in &self.streams {
            push_stream(&mut out, stream);
        }

        let spad_data = (flb - (out.len() + 22) % flb) % flb;
        push_stream(&mut out, &Stream::new(b"SPAD", &vec![0u8; spad_data]));
        assert_eq!(out.len() % flb, 0);
        out
    }
}

fn push_stream(out: &mut Vec<u8>, stream: &Stream) {
    let mut header = [0u8; 22];
    header[0..4].copy_from_slice(&stream.id);
    header[4..6].copy_from_slice(&stream.fs_attributes.to_le_bytes());
    header[6..8].copy_from_slice(&stream.media_attributes.to_le_bytes());
    header[8..16].copy_from_slice(&(stream.data.len() as u64).to_le_bytes());
    let sum = WordXor::compute(&header[..20]);
    header[20..22].copy_from_slice(&sum.to_le_bytes());

    out.extend_from_slice(&header);
    out.extend_from_slice(&stream.data);
    out.resize(out.len().next_multiple_of(4), 0);
}

/// Builds a tape as a list of tape files separated by filemarks.
pub struct TapeBuilder {
    flb: usize,
    files: Vec<Vec<u8>>,
    current: Vec<u8>,
}

impl TapeBuilder {
    pub fn new(flb: usize) -> Self {
        Self {
            flb,
            files: Vec::new(),
            current: Vec::new(),
        }
    }

    pub fn flb(&self) -> usize {
        self.flb
    }

    /// Append a finished descriptor block.
    pub fn block(mut self, block: Block) -> Self {
        let address = (self.current.len() / self.flb) as u64;
        let bytes = block.finish(self.flb, address);
        self.current.extend_from_slice(&bytes);
        self
    }

    pub fn filemark(mut self) -> Self {
        self.files.push(std::mem::take(&mut self.current));
        self
    }

    /// TAPE block of MTF major version `version`, followed by a filemark.
    pub fn tape_with_version(self, name: &str, version: u8) -> Self {
        let flb = self.flb as u16;
        let block = Block::new(b"TAPE", 94)
            .u32(52, 0x1234_5678)
            .u16(60, 1)
            .u16(84, flb)
            .date(88, BILLENNIUM)
            .u8(93, version)
            .string(68, name)
            .string(80, "oxitape tests");
        self.block(block).filemark()
    }

    pub fn tape(self, name: &str) -> Self {
        self.tape_with_version(name, 1)
    }

    pub fn sset(self, number: u16, name: &str) -> Self {
        let block = Block::new(b"SSET", 98)
            .u16(62, number)
            .string(64, name)
            .string(76, "operator")
            .date(88, BILLENNIUM)
            .u8(96, 0);
        self.block(block)
    }

    pub fn volb(self, volume: &str) -> Self {
        let block = Block::new(b"VOLB", 73)
            .string(56, "C:")
            .string(60, volume)
            .string(64, "HOST");
        self.block(block)
    }

    /// DIRB block; `name` uses `\0` as separator, as on tape.
    pub fn dirb(self, name: &str) -> Self {
        self.block(dirb(name))
    }

    pub fn file(self, name: &str, data: &[u8]) -> Self {
        self.block(file(name, data))
    }

    pub fn cfil(self) -> Self {
        self.block(Block::new(b"CFIL", 80))
    }

    pub fn espb(self) -> Self {
        self.block(Block::new(b"ESPB", 52))
    }

    /// Filemark, ESET, filemark.
    pub fn eset(self, number: u16) -> Self {
        self.filemark().eset_inline(number).filemark()
    }

    /// ESET with no filemark in front of it.
    pub fn eset_inline(self, number: u16) -> Self {
        let block = Block::new(b"ESET", 85)
            .u16(78, number)
            .date(80, BILLENNIUM);
        self.block(block)
    }

    pub fn build(mut self) -> Vec<Vec<u8>> {
        if !self.current.is_empty() {
            self.files.push(std::mem::take(&mut self.current));
        }
        self.files
    }
}

pub fn dirb(name: &str) -> Block {
    Block::new(b"DIRB", 84)
        .date(56, BILLENNIUM)
        .u32(76, 1)
        .string(80, name)
}

pub fn file(name: &str, data: &[u8]) -> Block {
    Block::new(b"FILE", 88)
        .date(56, BILLENNIUM)
        .date(61, BILLENNIUM)
        .date(71, BILLENNIUM)
        .u32(76, 1)
        .u32(80, 2)
        .string(84, name)
        .stream(Stream::new(b"NACL", &[0xAA; 40]))
        .stream(Stream::stan(data))
        .displayable_size(data.len() as u64)
}

/// The one-directory, one-file tape: `docs/a.txt` holding `hello world`.
pub fn docs_tape(flb: usize, file_name: &str) -> Vec<Vec<u8>> {
    TapeBuilder::new(flb)
        .tape("Media 1")
        .sset(1, "Set 1")
        .dirb("docs\0")
        .file(file_name, b"hello world")
        .eset(1)
        .build()
}

/// Serves tape files as physical blocks of a fixed size, with a filemark
/// after each file.
pub struct MemoryTape {
    reads: VecDeque<Option<Vec<u8>>>,
    pub issued: usize,
}

impl MemoryTape {
    pub fn new(files: &[Vec<u8>], physical: usize) -> Self {
        let mut reads = VecDeque::new();
        for file in files {
            for chunk in file.chunks(physical) {
                reads.push_back(Some(chunk.to_vec()));
            }
            reads.push_back(None);
        }
        Self { reads, issued: 0 }
    }

    /// Replace read number `index` with a device error.
    pub fn failing_at(self, index: usize) -> FailingTape {
        FailingTape {
            inner: self,
            fail_at: index,
        }
    }
}

impl BlockSource for MemoryTape {
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.issued += 1;
        match self.reads.pop_front() {
            Some(Some(block)) => {
                let n = block.len().min(buf.len());
                buf[..n].copy_from_slice(&block[..n]);
                Ok(n)
            }
            Some(None) | None => Ok(0),
        }
    }
}

pub struct FailingTape {
    inner: MemoryTape,
    fail_at: usize,
}

impl BlockSource for FailingTape {
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.inner.issued == self.fail_at {
            self.inner.issued += 1;
            return Err(io::Error::other("simulated medium error"));
        }
        self.inner.read_block(buf)
    }
}

/// Encode tape files as a SIMH `.tap` image ending in a double tape mark.
pub fn simh_image(files: &[Vec<u8>], record: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for file in files {
        for chunk in file.chunks(record) {
            let len = (chunk.len() as u32).to_le_bytes();
            out.extend_from_slice(&len);
            out.extend_from_slice(chunk);
            if chunk.len() % 2 == 1 {
                out.push(0);
            }
            out.extend_from_slice(&len);
        }
        out.extend_from_slice(&0u32.to_le_bytes());
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out
}

/// Collects extracted files in memory.
#[derive(Debug, Default)]
pub struct MemoryDestination {
    pub dirs: Vec<String>,
    pub files: BTreeMap<String, Vec<u8>>,
}

impl Destination for MemoryDestination {
    type Writer = Vec<u8>;

    fn create_dir(&mut self, path: &str) -> Result<()> {
        self.dirs.push(path.to_string());
        Ok(())
    }

    fn create_file(&mut self, _path: &str) -> Result<Self::Writer> {
        Ok(Vec::new())
    }

    fn finish_file(&mut self, path: &str, writer: Self::Writer, _entry: &Entry) -> Result<()> {
        self.files.insert(path.to_string(), writer);
        Ok(())
    }
}
