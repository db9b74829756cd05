//! Core traits at the seams between the tape reader and its collaborators.
//!
//! The reader itself never touches the filesystem and never interprets user
//! patterns. It hands directory requests and file payloads to a
//! [`Destination`] and asks a [`PathFilter`] whether a path should be read.

use crate::entry::Entry;
use crate::error::Result;
use std::io::Write;

/// Where extracted entries are materialised.
///
/// Paths passed to a destination are sanitized, `/`-separated and relative to
/// the destination's root.
pub trait Destination {
    /// Writer for one extracted file.
    type Writer: Write;

    /// Ensure a directory (and its parents) exists.
    fn create_dir(&mut self, path: &str) -> Result<()>;

    /// Create or truncate a file, creating missing parent directories.
    fn create_file(&mut self, path: &str) -> Result<Self::Writer>;

    /// Close a file produced by [`create_file`](Self::create_file) and apply
    /// the entry's timestamps.
    fn finish_file(&mut self, path: &str, writer: Self::Writer, entry: &Entry) -> Result<()>;
}

/// Decides which file paths are read from tape.
pub trait PathFilter {
    /// Whether `path` (after case folding) should be read.
    fn matches(&self, path: &str) -> bool;
}

impl<F: Fn(&str) -> bool> PathFilter for F {
    fn matches(&self, path: &str) -> bool {
        self(path)
    }
}

/// Case-folding policy applied to paths read from tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseFolding {
    /// Keep names as recorded.
    #[default]
    None,
    /// Fold to lower case.
    Lower,
    /// Fold to upper case.
    Upper,
}

impl CaseFolding {
    /// Apply the policy.
    ///
    /// Folding uses the locale-invariant Unicode mappings of `str`.
    pub fn apply(&self, path: &str) -> String {
        match self {
            Self::None => path.to_string(),
            Self::Lower => path.to_lowercase(),
            Self::Upper => path.to_uppercase(),
        }
    }
}

/// A destination that discards everything; used for list mode.
#[derive(Debug, Default)]
pub struct NullDestination;

impl Destination for NullDestination {
    type Writer = std::io::Sink;

    fn create_dir(&mut self, _path: &str) -> Result<()> {
        Ok(())
    }

    fn create_file(&mut self, _path: &str) -> Result<Self::Writer> {
        Ok(std::io::sink())
    }

    fn finish_file(&mut self, _path: &str, _writer: Self::Writer, _entry: &Entry) -> Result<()> {
        Ok(())
    }
}
