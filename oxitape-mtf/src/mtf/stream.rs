//! Stream walker.
//!
//! Streams follow their descriptor block back to back. A stream's data may
//! run across any number of physical and logical blocks; its end is padded
//! to four bytes, and when that lands on or past a logical block boundary the
//! window is advanced by whole logical blocks before the next header. The
//! stream list ends with an SPAD stream that pads to the next descriptor.
//!
//! Every walk returns the offset of the next stream header within the
//! window, which is always below the logical block size.

use super::block::{Advance, BlockReader};
use super::layout::{Layout, SPAD, STAN, StreamHeader, tag_name};
use super::verify_checksum;
use crate::source::BlockSource;
use oxitape_core::error::{MtfError, Result};
use std::io::Write;

/// Destination for the payload of a file's STAN stream.
pub struct StanSink<'w, W> {
    /// Receives the payload bytes.
    pub writer: &'w mut W,
    /// Path reported in destination errors.
    pub path: &'w str,
    /// Whether the owning descriptor allows compressed streams.
    pub compression_allowed: bool,
}

/// Walks streams through a [`BlockReader`].
pub struct StreamWalker<'a, S> {
    blocks: &'a mut BlockReader<S>,
    verify_checksums: bool,
}

impl<'a, S: BlockSource> StreamWalker<'a, S> {
    /// Create a walker over `blocks`.
    pub fn new(blocks: &'a mut BlockReader<S>, verify_checksums: bool) -> Self {
        Self {
            blocks,
            verify_checksums,
        }
    }

    /// Skip every stream from `first` up to and including the closing SPAD.
    pub fn skip_to_next_block(&mut self, first: usize) -> Result<()> {
        self.walk_streams::<std::io::Sink>(first, None)
    }

    /// Walk every stream from `first`, copying the first STAN payload into
    /// `stan` when given and skipping everything else.
    ///
    /// The walk ends after the SPAD stream, or after a STAN stream that ends
    /// exactly on a logical block boundary. The next descriptor must start at
    /// the front of the window.
    pub fn walk_streams<W: Write>(
        &mut self,
        first: usize,
        mut stan: Option<StanSink<'_, W>>,
    ) -> Result<()> {
        let mut at = first;

        loop {
            let (header, data_at) = self.read_header(at)?;

            // Only the first STAN stream is written.
            let sink = if header.id == STAN { stan.take() } else { None };
            at = match sink {
                Some(mut sink) => self.copy_stream(&header, data_at, &mut sink)?,
                None => self.skip_stream(&header, data_at)?,
            };

            if header.id == SPAD || (header.id == STAN && at == 0) {
                break;
            }
        }

        if at != 0 {
            return Err(MtfError::stream_alignment(at));
        }

        Ok(())
    }

    /// Copy the stream header at `at` out of the window.
    ///
    /// A header split across the end of the window is reassembled from the
    /// next block. Returns the header and the offset of its data.
    pub fn read_header(&mut self, at: usize) -> Result<(StreamHeader, usize)> {
        const SIZE: usize = StreamHeader::SIZE;

        if self.blocks.at_filemark() {
            return Err(MtfError::truncated_stream("stream header", SIZE as u64));
        }

        let mut raw = [0u8; SIZE];
        let remaining = self.blocks.window().remaining();

        let data_at = if at + SIZE <= remaining {
            raw.copy_from_slice(self.blocks.window().view(at, SIZE)?);
            at + SIZE
        } else {
            if at > remaining {
                return Err(MtfError::out_of_range(at, SIZE, remaining));
            }

            let head = remaining - at;
            raw[..head].copy_from_slice(self.blocks.window().view(at, head)?);

            if self.blocks.advance(remaining)? == Advance::Filemark {
                return Err(MtfError::truncated_stream(
                    "stream header",
                    (SIZE - head) as u64,
                ));
            }

            let tail = SIZE - head;
            raw[head..].copy_from_slice(self.blocks.window().view(0, tail)?);
            tail
        };

        if self.verify_checksums {
            verify_checksum("stream header", &raw, StreamHeader::CHECKSUMMED)?;
        }

        let header = StreamHeader::parse(&raw);
        log::debug!("Stream {}", tag_name(&header.id));
        log::debug!("System Attributes: {:04X}", header.fs_attributes);
        log::debug!("Media Attributes: {:04X}", header.media_attributes);
        log::debug!("Stream Length: {}", header.length);
        log::debug!("Data Encryption: {}", header.encryption);
        log::debug!("Data Compression: {}", header.compression);

        Ok((header, data_at))
    }

    /// Discard a stream's data. Returns the offset of the next header.
    pub fn skip_stream(&mut self, header: &StreamHeader, data_at: usize) -> Result<usize> {
        log::debug!("Skipping {} stream...", tag_name(&header.id));
        self.walk(header, data_at, |_| Ok(()))
    }

    /// Copy a stream's data into `sink`. Returns the offset of the next
    /// header.
    pub fn copy_stream<W: Write>(
        &mut self,
        header: &StreamHeader,
        data_at: usize,
        sink: &mut StanSink<'_, W>,
    ) -> Result<usize> {
        if sink.compression_allowed && header.is_compressed() {
            return Err(MtfError::unsupported("compressed streams"));
        }
        if header.is_encrypted() {
            return Err(MtfError::unsupported("encrypted streams"));
        }
        if header.is_sparse() {
            return Err(MtfError::unsupported("sparse streams"));
        }

        log::debug!("Reading {} stream...", tag_name(&header.id));

        let path = sink.path;
        let writer = &mut *sink.writer;
        self.walk(header, data_at, |bytes| {
            writer
                .write_all(bytes)
                .map_err(|e| MtfError::destination(path, e))
        })
    }

    fn walk<F>(&mut self, header: &StreamHeader, data_at: usize, mut sink: F) -> Result<usize>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        let mut pos = data_at;
        let mut left = header.length;

        loop {
            let window = self.blocks.window();
            let avail = window.remaining().saturating_sub(pos);
            let take = (avail as u64).min(left) as usize;

            if take > 0 {
                sink(window.view(pos, take)?)?;
            }

            pos += take;
            left -= take as u64;

            if left == 0 {
                break;
            }

            log::trace!("{} bytes of {} not yet read", left, tag_name(&header.id));

            if self.blocks.advance(0)? == Advance::Filemark {
                return Err(MtfError::truncated_stream(tag_name(&header.id), left));
            }
            pos = 0;
        }

        self.realign(pos)
    }

    fn realign(&mut self, pos: usize) -> Result<usize> {
        let flb = self.blocks.logical_block_size();
        if flb == 0 {
            return Err(MtfError::misaligned(pos, flb));
        }

        let mut pos = pos.next_multiple_of(4);

        if pos >= flb {
            let skip = pos - pos % flb;
            pos -= skip;
            // A filemark right after the last stream is the normal end of a
            // tape file; the caller sees it through `at_filemark`.
            self.blocks.advance(skip)?;
        }

        log::trace!("next stream header at {}", pos);
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mtf::layout::{STREAM_COMPRESSED, Tag};
    use oxitape_core::checksum::WordXor;
    use std::collections::VecDeque;
    use std::io;

    struct Blocks(VecDeque<Option<Vec<u8>>>);

    impl BlockSource for Blocks {
        fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(Some(block)) => {
                    buf[..block.len()].copy_from_slice(&block);
                    Ok(block.len())
                }
                Some(None) | None => Ok(0),
            }
        }
    }

    fn header(tag: Tag, media: u16, length: u64) -> Vec<u8> {
        let mut h = vec![0u8; StreamHeader::SIZE];
        h[0..4].copy_from_slice(&tag);
        h[6..8].copy_from_slice(&media.to_le_bytes());
        h[8..16].copy_from_slice(&length.to_le_bytes());
        let sum = WordXor::compute(&h[..StreamHeader::CHECKSUMMED]);
        h[20..22].copy_from_slice(&sum.to_le_bytes());
        h
    }

    fn stream(tag: Tag, payload: &[u8]) -> Vec<u8> {
        let mut s = header(tag, 0, payload.len() as u64);
        s.extend_from_slice(payload);
        while s.len() % 4 != 0 {
            s.push(0);
        }
        s
    }

    /// Append an SPAD that pads `bytes` to a multiple of `flb`.
    fn close_with_spad(bytes: &mut Vec<u8>, flb: usize) {
        bytes.resize(bytes.len().next_multiple_of(4), 0);
        let used = bytes.len() % flb + StreamHeader::SIZE;
        let pad = (flb - used % flb) % flb;
        bytes.extend_from_slice(&header(SPAD, 0, pad as u64));
        bytes.resize(bytes.len() + pad, 0);
    }

    fn reader(blocks: Vec<Option<Vec<u8>>>, size: usize) -> BlockReader<Blocks> {
        let mut reader = BlockReader::new(Blocks(blocks.into()), Some(size));
        reader.set_logical_block_size(512);
        reader.advance(0).unwrap();
        reader
    }

    #[test]
    fn test_copy_and_land_on_next_block() {
        let mut data = stream(STAN, b"hello world");
        close_with_spad(&mut data, 512);
        assert_eq!(data.len(), 512);

        let mut blocks = reader(vec![Some(data), Some(vec![0xAB; 512])], 512);
        let mut out = Vec::new();
        let sink = StanSink {
            writer: &mut out,
            path: "a.txt",
            compression_allowed: false,
        };
        StreamWalker::new(&mut blocks, true)
            .walk_streams(0, Some(sink))
            .unwrap();

        assert_eq!(out, b"hello world");
        assert_eq!(blocks.window().bytes()[0], 0xAB);
    }

    #[test]
    fn test_only_first_stan_is_copied() {
        let mut data = stream(STAN, b"first");
        data.extend_from_slice(&stream(STAN, b"second"));
        close_with_spad(&mut data, 512);
        assert_eq!(data.len(), 512);

        let mut blocks = reader(vec![Some(data), Some(vec![0xEF; 512])], 512);
        let mut out = Vec::new();
        let sink = StanSink {
            writer: &mut out,
            path: "twice.txt",
            compression_allowed: false,
        };
        StreamWalker::new(&mut blocks, true)
            .walk_streams(0, Some(sink))
            .unwrap();

        assert_eq!(out, b"first");
        assert_eq!(blocks.window().bytes()[0], 0xEF);
    }

    #[test]
    fn test_header_split_across_blocks() {
        let payload = vec![7u8; 478];
        let mut data = stream(STAN, &payload);
        assert_eq!(data.len(), 500);
        close_with_spad(&mut data, 512);
        assert_eq!(data.len(), 1024);

        let blocks = vec![
            Some(data[..512].to_vec()),
            Some(data[512..].to_vec()),
            Some(vec![0xCD; 512]),
        ];
        let mut blocks = reader(blocks, 512);
        let mut out = Vec::new();
        let sink = StanSink {
            writer: &mut out,
            path: "big.bin",
            compression_allowed: false,
        };
        StreamWalker::new(&mut blocks, true)
            .walk_streams(0, Some(sink))
            .unwrap();

        assert_eq!(out, payload);
        assert_eq!(blocks.window().bytes()[0], 0xCD);
    }

    #[test]
    fn test_truncated_stream_at_filemark() {
        let mut data = header(STAN, 0, 1000);
        data.resize(512, 1);

        let mut blocks = reader(vec![Some(data), None], 512);
        let err = StreamWalker::new(&mut blocks, false)
            .skip_to_next_block(0)
            .unwrap_err();
        assert!(matches!(err, MtfError::TruncatedStream { missing: 510, .. }));
    }

    #[test]
    fn test_compressed_stream_rejected_only_when_copying() {
        let mut data = header(STAN, STREAM_COMPRESSED, 4);
        data.extend_from_slice(b"zzzz");
        close_with_spad(&mut data, 512);

        let mut blocks = reader(vec![Some(data.clone())], 512);
        let mut out = Vec::new();
        let sink = StanSink {
            writer: &mut out,
            path: "c.bin",
            compression_allowed: true,
        };
        let err = StreamWalker::new(&mut blocks, false)
            .walk_streams(0, Some(sink))
            .unwrap_err();
        assert!(matches!(err, MtfError::UnsupportedFeature { .. }));

        let mut blocks = reader(vec![Some(data), Some(vec![0; 512])], 512);
        StreamWalker::new(&mut blocks, false)
            .skip_to_next_block(0)
            .unwrap();
    }

    #[test]
    fn test_walk_must_end_on_block_boundary() {
        let mut data = stream(STAN, b"abc");
        data.extend_from_slice(&stream(SPAD, &[0u8; 10]));
        data.resize(512, 0);

        let mut blocks = reader(vec![Some(data)], 512);
        let err = StreamWalker::new(&mut blocks, false)
            .skip_to_next_block(0)
            .unwrap_err();
        assert!(matches!(err, MtfError::StreamAlignment { offset: 60 }));
    }

    #[test]
    fn test_stream_checksum_verification() {
        let mut data = stream(STAN, b"abc");
        data[20] ^= 0xFF;
        close_with_spad(&mut data, 512);

        let mut blocks = reader(vec![Some(data.clone()), Some(vec![0; 512])], 512);
        let err = StreamWalker::new(&mut blocks, true)
            .skip_to_next_block(0)
            .unwrap_err();
        assert!(matches!(err, MtfError::ChecksumMismatch { .. }));

        let mut blocks = reader(vec![Some(data), Some(vec![0; 512])], 512);
        StreamWalker::new(&mut blocks, false)
            .skip_to_next_block(0)
            .unwrap();
    }
}
