//! Tape block reader.
//!
//! Turns a stream of physical blocks into a window that always starts at a
//! logical block boundary and holds at least one full logical block.
//!
//! The physical block size is either given or detected from the first read,
//! which asks for [`MAX_TAPE_BLOCK_SIZE`] bytes. The logical block size is
//! unknown until the TAPE descriptor has been parsed; until then every
//! refill issues exactly one read.

use super::window::{Fill, Window};
use crate::source::{BlockSource, MAX_TAPE_BLOCK_SIZE};
use oxitape_core::error::{MtfError, Result};
use std::path::PathBuf;

/// Result of [`BlockReader::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The window is positioned and holds data.
    Ready,
    /// A filemark was read; the window is empty.
    Filemark,
}

/// Physical-to-logical block reassembly.
#[derive(Debug)]
pub struct BlockReader<S> {
    source: S,
    window: Window,
    physical: Option<usize>,
    logical: usize,
    blocks: u64,
    filemark: bool,
    dump_path: Option<PathBuf>,
}

impl<S: BlockSource> BlockReader<S> {
    /// Create a reader; `physical` overrides block size detection.
    pub fn new(source: S, physical: Option<usize>) -> Self {
        Self {
            source,
            window: Window::new(),
            physical,
            logical: 0,
            blocks: 0,
            filemark: false,
            dump_path: None,
        }
    }

    /// Write the window to `path` after every refill.
    pub fn dump_each_block(&mut self, path: impl Into<PathBuf>) {
        self.dump_path = Some(path.into());
    }

    /// The current window.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Physical block size, once known.
    pub fn physical_block_size(&self) -> Option<usize> {
        self.physical
    }

    /// Format logical block size; zero before the TAPE block.
    pub fn logical_block_size(&self) -> usize {
        self.logical
    }

    /// Record the format logical block size from the TAPE block.
    pub fn set_logical_block_size(&mut self, size: usize) {
        self.logical = size;
    }

    /// Number of refills performed.
    pub fn block_count(&self) -> u64 {
        self.blocks
    }

    /// Whether the last read hit a filemark.
    pub fn at_filemark(&self) -> bool {
        self.filemark
    }

    /// Forget a filemark once the caller has acted on it.
    pub fn clear_filemark(&mut self) {
        self.filemark = false;
    }

    /// Give the source back.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Move the window forward by `skip` bytes.
    ///
    /// With `skip` of zero, equal to the whole window, or on an empty window
    /// the window is discarded and refilled with fresh blocks. A `skip`
    /// beyond the window first reads until the window covers it. Otherwise
    /// `skip` must be a whole number of logical blocks.
    pub fn advance(&mut self, skip: usize) -> Result<Advance> {
        log::trace!("advance={} remaining={}", skip, self.window.remaining());

        loop {
            let remaining = self.window.remaining();

            if skip == 0 || skip == remaining || remaining == 0 {
                self.window.clear();
                return self.refill();
            }

            if skip > remaining {
                log::trace!("reading past {} buffered bytes to skip {}", remaining, skip);
                while self.window.remaining() < skip {
                    if self.read_one()? == Fill::Filemark {
                        return Ok(Advance::Filemark);
                    }
                }
                continue;
            }

            if self.logical == 0 || skip % self.logical != 0 {
                return Err(MtfError::misaligned(skip, self.logical));
            }

            log::trace!("advancing {} bytes", skip);
            self.window.consume(skip);
            return Ok(Advance::Ready);
        }
    }

    /// Read more physical blocks until the window holds a whole logical
    /// block. Used once the logical block size becomes known mid-block.
    pub fn fill_logical_block(&mut self) -> Result<Advance> {
        while self.window.remaining() < self.logical {
            if self.read_one()? == Fill::Filemark {
                return Ok(Advance::Filemark);
            }
        }
        Ok(Advance::Ready)
    }

    /// Read physical blocks past `count` filemarks, leaving the window empty.
    pub fn skip_filemarks(&mut self, count: usize) -> Result<()> {
        self.window.clear();
        let mut seen = 0;
        while seen < count {
            match self.read_one()? {
                Fill::Filemark => seen += 1,
                Fill::Data(_) => self.window.clear(),
            }
        }
        self.filemark = false;
        Ok(())
    }

    fn refill(&mut self) -> Result<Advance> {
        loop {
            if self.read_one()? == Fill::Filemark {
                return Ok(Advance::Filemark);
            }
            if self.logical == 0 || self.window.remaining() >= self.logical {
                break;
            }
        }

        self.blocks += 1;
        log::trace!("remaining={}", self.window.remaining());
        self.dump_window();
        Ok(Advance::Ready)
    }

    fn read_one(&mut self) -> Result<Fill> {
        let size = self.physical.unwrap_or(MAX_TAPE_BLOCK_SIZE);
        match self.window.fill(&mut self.source, size)? {
            Fill::Data(n) => {
                if self.physical.is_none() {
                    log::info!("Detected {}-byte tape block size", n);
                    self.physical = Some(n);
                }
                Ok(Fill::Data(n))
            }
            Fill::Filemark => {
                log::info!("Read filemark");
                self.filemark = true;
                self.window.clear();
                Ok(Fill::Filemark)
            }
        }
    }

    fn dump_window(&self) {
        if let Some(path) = &self.dump_path {
            if let Err(e) = std::fs::write(path, self.window.bytes()) {
                log::warn!("Unable to write {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// Blocks of the given sizes, each filled with its index; `None` is a
    /// filemark.
    struct Script(VecDeque<Option<Vec<u8>>>);

    impl Script {
        fn new(blocks: &[Option<usize>]) -> Self {
            Self(
                blocks
                    .iter()
                    .enumerate()
                    .map(|(i, b)| b.map(|n| vec![i as u8; n]))
                    .collect(),
            )
        }
    }

    impl BlockSource for Script {
        fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(Some(block)) => {
                    let n = block.len().min(buf.len());
                    buf[..n].copy_from_slice(&block[..n]);
                    Ok(n)
                }
                Some(None) | None => Ok(0),
            }
        }
    }

    struct Failing;

    impl BlockSource for Failing {
        fn read_block(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("medium error"))
        }
    }

    #[test]
    fn test_detects_physical_block_size() {
        let mut reader = BlockReader::new(Script::new(&[Some(2048)]), None);
        assert_eq!(reader.advance(0).unwrap(), Advance::Ready);
        assert_eq!(reader.physical_block_size(), Some(2048));
        assert_eq!(reader.window().remaining(), 2048);
        assert_eq!(reader.block_count(), 1);
    }

    #[test]
    fn test_small_physical_blocks_fill_a_logical_block() {
        let blocks = [Some(512), Some(512), Some(512), Some(512)];
        let mut reader = BlockReader::new(Script::new(&blocks), Some(512));
        reader.set_logical_block_size(1024);

        assert_eq!(reader.advance(0).unwrap(), Advance::Ready);
        assert_eq!(reader.window().remaining(), 1024);
        assert_eq!(reader.window().bytes()[512], 1);

        assert_eq!(reader.advance(0).unwrap(), Advance::Ready);
        assert_eq!(reader.window().bytes()[0], 2);
    }

    #[test]
    fn test_mid_window_advance_must_be_aligned() {
        let mut reader = BlockReader::new(Script::new(&[Some(4096)]), None);
        reader.advance(0).unwrap();
        reader.set_logical_block_size(1024);

        assert_eq!(reader.advance(1024).unwrap(), Advance::Ready);
        assert_eq!(reader.window().remaining(), 3072);

        assert!(matches!(
            reader.advance(100),
            Err(MtfError::MisalignedAdvance {
                advance: 100,
                block_size: 1024
            })
        ));
    }

    #[test]
    fn test_advance_past_window_reads_more() {
        let blocks = [Some(1024), Some(1024), Some(1024)];
        let mut reader = BlockReader::new(Script::new(&blocks), Some(1024));
        reader.set_logical_block_size(512);
        reader.advance(0).unwrap();

        // 1536 needs a second block, then consumes within the grown window.
        assert_eq!(reader.advance(1536).unwrap(), Advance::Ready);
        assert_eq!(reader.window().remaining(), 512);
        assert_eq!(reader.window().bytes()[0], 1);
    }

    #[test]
    fn test_filemark_empties_window() {
        let blocks = [Some(1024), None, Some(1024)];
        let mut reader = BlockReader::new(Script::new(&blocks), None);
        reader.advance(0).unwrap();
        reader.set_logical_block_size(1024);

        assert_eq!(reader.advance(0).unwrap(), Advance::Filemark);
        assert!(reader.at_filemark());
        assert!(reader.window().is_empty());

        reader.clear_filemark();
        assert_eq!(reader.advance(0).unwrap(), Advance::Ready);
        assert!(!reader.at_filemark());
    }

    #[test]
    fn test_filemark_mid_logical_block() {
        let blocks = [Some(512), None];
        let mut reader = BlockReader::new(Script::new(&blocks), Some(512));
        reader.set_logical_block_size(1024);
        assert_eq!(reader.advance(0).unwrap(), Advance::Filemark);
        assert!(reader.window().is_empty());
    }

    #[test]
    fn test_fill_logical_block_after_discovery() {
        let blocks = [Some(512), Some(512), Some(512)];
        let mut reader = BlockReader::new(Script::new(&blocks), None);
        reader.advance(0).unwrap();
        assert_eq!(reader.window().remaining(), 512);

        reader.set_logical_block_size(1024);
        assert_eq!(reader.fill_logical_block().unwrap(), Advance::Ready);
        assert_eq!(reader.window().remaining(), 1024);
        assert_eq!(reader.window().bytes()[1023], 1);
    }

    #[test]
    fn test_skip_filemarks() {
        let blocks = [Some(512), None, Some(512), Some(512), None, Some(512)];
        let mut reader = BlockReader::new(Script::new(&blocks), Some(512));
        reader.set_logical_block_size(512);
        reader.skip_filemarks(2).unwrap();
        assert!(!reader.at_filemark());
        assert_eq!(reader.advance(0).unwrap(), Advance::Ready);
        assert_eq!(reader.window().bytes()[0], 5);
    }

    #[test]
    fn test_device_error_is_not_a_filemark() {
        let mut reader = BlockReader::new(Failing, None);
        let err = reader.advance(0).unwrap_err();
        assert!(err.is_device_error());
        assert!(!reader.at_filemark());
    }
}
