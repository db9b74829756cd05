//! Error types for OxiTape operations.
//!
//! Every error in this module is fatal to the read that produced it: a
//! single misparsed offset invalidates every later position on the tape, so
//! callers are expected to stop and report rather than resynchronise.

use std::io;
use thiserror::Error;

/// The main error type for OxiTape operations.
#[derive(Debug, Error)]
pub enum MtfError {
    /// I/O failure reading the tape device or image.
    #[error("Device read error: {0}")]
    DeviceRead(#[from] io::Error),

    /// A descriptor block appeared where the protocol expects another type.
    #[error("Unexpected descriptor block type '{found}' (expected {expected})")]
    UnexpectedBlockType {
        /// What the reader expected at this position.
        expected: String,
        /// The printable form of the tag that was found.
        found: String,
    },

    /// The TAPE block declares an MTF major version this reader does not know.
    #[error("Unexpected MTF major version {version}")]
    UnexpectedVersion {
        /// Major version from the TAPE block.
        version: u8,
    },

    /// A recognised but deliberately unimplemented format feature.
    #[error("Unsupported feature: {feature}")]
    UnsupportedFeature {
        /// Description of the feature.
        feature: String,
    },

    /// A mid-window advance that is not a whole number of logical blocks.
    #[error("Illegal read request: advance of {advance} bytes is not a multiple of the {block_size}-byte logical block")]
    MisalignedAdvance {
        /// Requested advance in bytes.
        advance: usize,
        /// Current format logical block size.
        block_size: usize,
    },

    /// Walking the streams of a descriptor did not end on a logical block boundary.
    #[error("Stream walk ended at offset {offset}, not on a logical block boundary")]
    StreamAlignment {
        /// Offset within the logical block where the walk stopped.
        offset: usize,
    },

    /// A descriptor places its first stream inside its own common header.
    #[error("Descriptor block '{block}' places its first stream at offset {offset}, inside the 52-byte header")]
    BadStreamOffset {
        /// Printable block tag.
        block: String,
        /// Offset to the first stream as recorded.
        offset: u16,
    },

    /// A structural view reaches past the buffered bytes.
    #[error("View of {len} bytes at offset {offset} exceeds the {available} buffered bytes")]
    OutOfRange {
        /// Start of the requested view.
        offset: usize,
        /// Length of the requested view.
        len: usize,
        /// Number of valid bytes in the window.
        available: usize,
    },

    /// A filemark arrived before a stream's declared length was consumed.
    #[error("Filemark reached with {missing} bytes of stream '{stream}' unread")]
    TruncatedStream {
        /// Printable stream tag.
        stream: String,
        /// Bytes still owed by the stream.
        missing: u64,
    },

    /// Header checksum verification failed.
    #[error("Checksum mismatch in {what}: stored {stored:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        /// Which header was checked.
        what: String,
        /// Checksum stored on tape.
        stored: u16,
        /// Checksum computed from the header words.
        computed: u16,
    },

    /// Failure creating a directory or file, or setting its timestamps.
    #[error("Destination error for {path}: {source}")]
    Destination {
        /// Path being materialised.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Path traversal attempt in a name read from tape.
    #[error("Path traversal detected in entry: {path}")]
    PathTraversal {
        /// The suspicious path.
        path: String,
    },

    /// A path filter pattern failed to compile.
    #[error("Invalid pattern \"{pattern}\": {message}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// Compiler message.
        message: String,
    },
}

/// Result type alias for OxiTape operations.
pub type Result<T> = std::result::Result<T, MtfError>;

impl MtfError {
    /// Create an unexpected block type error.
    pub fn unexpected_block(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedBlockType {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            feature: feature.into(),
        }
    }

    /// Create a misaligned advance error.
    pub fn misaligned(advance: usize, block_size: usize) -> Self {
        Self::MisalignedAdvance {
            advance,
            block_size,
        }
    }

    /// Create a stream alignment error.
    pub fn stream_alignment(offset: usize) -> Self {
        Self::StreamAlignment { offset }
    }

    /// Create a bad first-stream offset error.
    pub fn bad_stream_offset(block: impl Into<String>, offset: u16) -> Self {
        Self::BadStreamOffset {
            block: block.into(),
            offset,
        }
    }

    /// Create an out-of-range view error.
    pub fn out_of_range(offset: usize, len: usize, available: usize) -> Self {
        Self::OutOfRange {
            offset,
            len,
            available,
        }
    }

    /// Create a truncated stream error.
    pub fn truncated_stream(stream: impl Into<String>, missing: u64) -> Self {
        Self::TruncatedStream {
            stream: stream.into(),
            missing,
        }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(what: impl Into<String>, stored: u16, computed: u16) -> Self {
        Self::ChecksumMismatch {
            what: what.into(),
            stored,
            computed,
        }
    }

    /// Create a destination error.
    pub fn destination(path: impl Into<String>, source: io::Error) -> Self {
        Self::Destination {
            path: path.into(),
            source,
        }
    }

    /// Create a path traversal error.
    pub fn path_traversal(path: impl Into<String>) -> Self {
        Self::PathTraversal { path: path.into() }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// True for errors raised by the tape device rather than by the format.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceRead(_))
    }
}
