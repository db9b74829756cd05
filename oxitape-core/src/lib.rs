//! # OxiTape Core
//!
//! Core components for the OxiTape Microsoft Tape Format reader.
//!
//! - [`checksum`]: 16-bit word-XOR header checksums
//! - [`traits`]: Destination and path filter seams
//! - [`entry`]: Tape entry metadata
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: CLI                                                 │
//! │     list / extract / info / detect                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: MTF                                                 │
//! │     Descriptor dispatch, stream walker, filesystem sink │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Tape I/O                                            │
//! │     Block sources, logical block window                 │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: Core (this crate)                                   │
//! │     Checksums, entries, errors, traits                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxitape_core::checksum::WordXor;
//! use oxitape_core::entry::sanitize_path;
//!
//! let sum = WordXor::compute(b"TAPE");
//! assert_eq!(sum, u16::from_le_bytes(*b"TA") ^ u16::from_le_bytes(*b"PE"));
//!
//! assert_eq!(sanitize_path("C:\\docs\\..\\a.txt"), "docs/a.txt");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod checksum;
pub mod entry;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use checksum::WordXor;
pub use entry::{Entry, EntryType, FileAttributes};
pub use error::{MtfError, Result};
pub use traits::{CaseFolding, Destination, NullDestination, PathFilter};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::checksum::WordXor;
    pub use crate::entry::{Entry, EntryType, FileAttributes};
    pub use crate::error::{MtfError, Result};
    pub use crate::traits::{CaseFolding, Destination, NullDestination, PathFilter};
}
