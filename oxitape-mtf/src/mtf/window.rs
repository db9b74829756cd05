//! Byte window over the most recently read physical blocks.
//!
//! The window holds `remaining` valid bytes at its front. Reads append whole
//! physical blocks at the tail; consuming shifts the unread tail to the
//! front so descriptor parsing always starts at offset zero.

use super::layout::Layout;
use crate::source::{BlockSource, MAX_TAPE_BLOCK_SIZE};
use oxitape_core::error::{MtfError, Result};

/// Outcome of one physical read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// A block of this many bytes was appended.
    Data(usize),
    /// The source reported a filemark; nothing was appended.
    Filemark,
}

/// Buffer of contiguous tape bytes.
#[derive(Debug)]
pub struct Window {
    buf: Vec<u8>,
    remaining: usize,
}

impl Window {
    /// Create an empty window sized for the largest physical block.
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; MAX_TAPE_BLOCK_SIZE],
            remaining: 0,
        }
    }

    /// Number of valid bytes.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether the window holds no valid bytes.
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// The valid bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.remaining]
    }

    /// Borrow `len` bytes at `offset`.
    pub fn view(&self, offset: usize, len: usize) -> Result<&[u8]> {
        match offset.checked_add(len) {
            Some(end) if end <= self.remaining => Ok(&self.buf[offset..end]),
            _ => Err(MtfError::out_of_range(offset, len, self.remaining)),
        }
    }

    /// Decode a fixed-size record at `offset`.
    pub fn read<T: Layout>(&self, offset: usize) -> Result<T> {
        self.view(offset, T::SIZE).map(T::parse)
    }

    /// Drop `n` bytes from the front.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(
            n <= self.remaining,
            "consume {} of {} bytes",
            n,
            self.remaining
        );
        let n = n.min(self.remaining);
        self.buf.copy_within(n..self.remaining, 0);
        self.remaining -= n;
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.remaining = 0;
    }

    /// Append one physical block of up to `size` bytes.
    pub fn fill<S: BlockSource + ?Sized>(&mut self, source: &mut S, size: usize) -> Result<Fill> {
        let end = self.remaining + size;
        if self.buf.len() < end {
            self.buf.resize(end, 0);
        }

        let n = source.read_block(&mut self.buf[self.remaining..end])?;
        if n == 0 {
            return Ok(Fill::Filemark);
        }

        self.remaining += n;
        Ok(Fill::Data(n))
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mtf::layout::{STAN, StreamHeader};
    use std::collections::VecDeque;
    use std::io;

    struct Blocks(VecDeque<Vec<u8>>);

    impl BlockSource for Blocks {
        fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(block) => {
                    buf[..block.len()].copy_from_slice(&block);
                    Ok(block.len())
                }
                None => Ok(0),
            }
        }
    }

    #[test]
    fn test_fill_and_consume() {
        let mut src = Blocks(VecDeque::from(vec![vec![1u8; 4], vec![2u8; 4]]));
        let mut win = Window::new();

        assert_eq!(win.fill(&mut src, 512).unwrap(), Fill::Data(4));
        assert_eq!(win.fill(&mut src, 512).unwrap(), Fill::Data(4));
        assert_eq!(win.bytes(), &[1, 1, 1, 1, 2, 2, 2, 2]);

        win.consume(4);
        assert_eq!(win.bytes(), &[2, 2, 2, 2]);

        assert_eq!(win.fill(&mut src, 512).unwrap(), Fill::Filemark);
        assert_eq!(win.remaining(), 4);

        win.clear();
        assert!(win.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "consume 5 of 4 bytes")]
    fn test_consume_past_remaining_panics_in_debug() {
        let mut src = Blocks(VecDeque::from(vec![vec![1u8; 4]]));
        let mut win = Window::new();
        win.fill(&mut src, 512).unwrap();
        win.consume(5);
    }

    #[test]
    fn test_view_bounds() {
        let mut src = Blocks(VecDeque::from(vec![vec![0u8; 16]]));
        let mut win = Window::new();
        win.fill(&mut src, 512).unwrap();

        assert!(win.view(0, 16).is_ok());
        assert!(win.view(8, 8).is_ok());
        assert!(matches!(
            win.view(8, 9),
            Err(MtfError::OutOfRange {
                offset: 8,
                len: 9,
                available: 16
            })
        ));
        assert!(win.view(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_read_layout() {
        let mut block = vec![0u8; 30];
        block[4..8].copy_from_slice(b"STAN");
        block[12..20].copy_from_slice(&5u64.to_le_bytes());
        let mut src = Blocks(VecDeque::from(vec![block]));
        let mut win = Window::new();
        win.fill(&mut src, 512).unwrap();

        let hdr: StreamHeader = win.read(4).unwrap();
        assert_eq!(hdr.id, STAN);
        assert_eq!(hdr.length, 5);
        assert!(win.read::<StreamHeader>(10).is_err());
    }

    #[test]
    fn test_grows_past_initial_capacity() {
        let blocks = (0..3).map(|i| vec![i as u8; MAX_TAPE_BLOCK_SIZE]).collect();
        let mut src = Blocks(blocks);
        let mut win = Window::new();
        for _ in 0..3 {
            win.fill(&mut src, MAX_TAPE_BLOCK_SIZE).unwrap();
        }
        assert_eq!(win.remaining(), 3 * MAX_TAPE_BLOCK_SIZE);
        assert_eq!(win.bytes()[2 * MAX_TAPE_BLOCK_SIZE], 2);
    }
}
