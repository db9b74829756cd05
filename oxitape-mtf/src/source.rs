//! Physical block sources.
//!
//! A tape drive hands out one physical block per read and reports a filemark
//! as a zero-length read. [`BlockSource`] captures exactly that contract so the
//! reader can run against a character device, a plain image file, or a SIMH
//! `.tap` image (which records block boundaries and tape marks explicitly).

use std::io::{self, Read};

/// Maximum physical block size requested from a source.
pub const MAX_TAPE_BLOCK_SIZE: usize = 65536;

/// Minimum physical block size accepted as an override.
pub const MIN_TAPE_BLOCK_SIZE: usize = 512;

/// A source of physical tape blocks.
pub trait BlockSource {
    /// Read one physical block into `buf`.
    ///
    /// Returns the number of bytes read; `Ok(0)` is a filemark (or the end of
    /// the medium).
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<T: BlockSource + ?Sized> BlockSource for &mut T {
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_block(buf)
    }
}

impl<T: BlockSource + ?Sized> BlockSource for Box<T> {
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_block(buf)
    }
}

/// A tape device or image read with one `read` call per block.
///
/// On a tape character device each call returns exactly one block and a
/// filemark reads as zero bytes. On a regular file every call fills the
/// buffer until end of file, which then reads as a filemark.
#[derive(Debug)]
pub struct RawDevice<R> {
    inner: R,
}

impl<R: Read> RawDevice<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> BlockSource for RawDevice<R> {
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.inner.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }
}

/// SIMH record marker: tape mark.
const SIMH_TAPE_MARK: u32 = 0x0000_0000;
/// SIMH record marker: erase gap.
const SIMH_ERASE_GAP: u32 = 0xFFFF_FFFE;
/// SIMH record marker: end of medium.
const SIMH_END_OF_MEDIUM: u32 = 0xFFFF_FFFF;
/// Record class bits; class 0 is a good data record.
const SIMH_CLASS_MASK: u32 = 0xF000_0000;
/// Record length bits.
const SIMH_LENGTH_MASK: u32 = 0x0FFF_FFFF;

/// A SIMH `.tap` tape image.
///
/// Each record is stored as `len(u32 LE) data [pad] len(u32 LE)`, with odd
/// lengths padded to even. A zero length word is a tape mark.
#[derive(Debug)]
pub struct SimhTape<R> {
    inner: R,
    records: u64,
    marks: u64,
}

impl<R: Read> SimhTape<R> {
    /// Wrap a reader positioned at the start of the image.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            records: 0,
            marks: 0,
        }
    }

    /// Number of data records read so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Number of tape marks read so far.
    pub fn tape_marks(&self) -> u64 {
        self.marks
    }

    /// Read a length word; `None` at a clean end of file.
    fn read_marker(&mut self) -> io::Result<Option<u32>> {
        let mut word = [0u8; 4];
        let mut filled = 0;
        while filled < word.len() {
            match self.inner.read(&mut word[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "truncated SIMH record marker",
                    ));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(Some(u32::from_le_bytes(word)))
    }
}

impl<R: Read> BlockSource for SimhTape<R> {
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let marker = match self.read_marker()? {
                None => return Ok(0),
                Some(m) => m,
            };

            match marker {
                SIMH_TAPE_MARK => {
                    self.marks += 1;
                    return Ok(0);
                }
                SIMH_END_OF_MEDIUM => return Ok(0),
                SIMH_ERASE_GAP => continue,
                _ => {}
            }

            if marker & SIMH_CLASS_MASK != 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("SIMH record marked bad (marker {marker:#010x})"),
                ));
            }

            let len = (marker & SIMH_LENGTH_MASK) as usize;
            if len > buf.len() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "SIMH record of {len} bytes exceeds the {}-byte read buffer",
                        buf.len()
                    ),
                ));
            }

            self.inner.read_exact(&mut buf[..len])?;
            if len % 2 == 1 {
                let mut pad = [0u8; 1];
                self.inner.read_exact(&mut pad)?;
            }

            let trailer = self.read_marker()?.ok_or_else(|| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "missing SIMH trailing length")
            })?;
            if trailer != marker {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("SIMH trailing length {trailer:#010x} does not match {marker:#010x}"),
                ));
            }

            self.records += 1;
            return Ok(len);
        }
    }
}
