//! Tape image format auto-detection.
//!
//! An MTF medium always begins with a TAPE descriptor block, so the first
//! four bytes of a raw image are `TAPE`. A SIMH image wraps that same block
//! in a 4-byte record length.

use oxitape_core::error::Result;
use std::io::Read;

/// Known tape image layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeFormat {
    /// Raw MTF stream (.bkf, `dd` dump, or a tape device).
    Mtf,
    /// MTF stream inside a SIMH tape image (.tap).
    Simh,
    /// Unknown layout.
    Unknown,
}

impl TapeFormat {
    /// Detect the layout from the first bytes of an image.
    pub fn from_magic(magic: &[u8]) -> Self {
        if magic.len() < 4 {
            return Self::Unknown;
        }

        if magic.starts_with(b"TAPE") {
            return Self::Mtf;
        }

        if magic.len() >= 8 && &magic[4..8] == b"TAPE" {
            let len = u32::from_le_bytes([magic[0], magic[1], magic[2], magic[3]]);
            // Good-record class, at least a full descriptor header.
            if len & 0xF000_0000 == 0 && len >= 52 {
                return Self::Simh;
            }
        }

        Self::Unknown
    }

    /// Detect the layout from a reader.
    pub fn detect<R: Read>(reader: &mut R) -> Result<(Self, Vec<u8>)> {
        let mut magic = vec![0u8; 8];
        let mut filled = 0;
        while filled < magic.len() {
            let n = reader.read(&mut magic[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        magic.truncate(filled);

        Ok((Self::from_magic(&magic), magic))
    }

    /// Get the typical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mtf => "bkf",
            Self::Simh => "tap",
            Self::Unknown => "",
        }
    }

    /// Whether the layout preserves filemarks inside a plain file.
    pub fn has_filemarks(&self) -> bool {
        matches!(self, Self::Simh)
    }
}

impl std::fmt::Display for TapeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mtf => write!(f, "MTF"),
            Self::Simh => write!(f, "SIMH tape image"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}
