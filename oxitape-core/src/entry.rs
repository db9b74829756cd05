//! Tape entry metadata.
//!
//! This module defines the `Entry` struct that represents a file or directory
//! recorded in an MTF data set, along with its metadata.

use std::time::SystemTime;

/// Entry type (file or directory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryType {
    /// Regular file (FILE descriptor block).
    #[default]
    File,
    /// Directory (DIRB descriptor block).
    Directory,
}

impl EntryType {
    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// File attributes carried in FILE and DIRB descriptor blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileAttributes {
    /// Read-only bit.
    pub read_only: bool,
    /// Hidden bit.
    pub hidden: bool,
    /// System bit.
    pub system: bool,
    /// Modified since last backup.
    pub modified: bool,
}

impl FileAttributes {
    /// Create new empty attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the attribute word of a FILE or DIRB block, which keeps
    /// these flags in bits 8-11.
    pub fn from_mtf(attr: u32) -> Self {
        Self {
            read_only: attr & 0x0100 != 0,
            hidden: attr & 0x0200 != 0,
            system: attr & 0x0400 != 0,
            modified: attr & 0x0800 != 0,
        }
    }

    /// Render as a four-character flag string (`RHSA`).
    pub fn flags(&self) -> String {
        let mut s = String::with_capacity(4);
        s.push(if self.read_only { 'R' } else { '-' });
        s.push(if self.hidden { 'H' } else { '-' });
        s.push(if self.system { 'S' } else { '-' });
        s.push(if self.modified { 'A' } else { '-' });
        s
    }
}

/// An entry read from a tape.
///
/// Entries are produced while the tape is walked; a reader in list mode
/// produces the same entries it would extract.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Path of the entry relative to the extraction root, `/`-separated.
    pub name: String,
    /// The type of entry.
    pub entry_type: EntryType,
    /// Displayable size from the descriptor header.
    pub size: u64,
    /// Last modification time.
    pub modified: Option<SystemTime>,
    /// Creation time.
    pub created: Option<SystemTime>,
    /// Last access time.
    pub accessed: Option<SystemTime>,
    /// Attribute flags.
    pub attributes: FileAttributes,
    /// Number of the data set the entry belongs to.
    pub data_set: u16,
    /// Set when the descriptor carried the corrupt flag.
    pub corrupt: bool,
    /// Format logical address of the descriptor block.
    pub offset: u64,
}

impl Entry {
    /// Create a new file entry.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::File,
            size,
            modified: None,
            created: None,
            accessed: None,
            attributes: FileAttributes::default(),
            data_set: 0,
            corrupt: false,
            offset: 0,
        }
    }

    /// Create a new directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            entry_type: EntryType::Directory,
            ..Self::file(name, 0)
        }
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.entry_type.is_file()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.entry_type.is_dir()
    }

    /// Builder method to set modification time.
    pub fn with_modified(mut self, time: SystemTime) -> Self {
        self.modified = Some(time);
        self
    }

    /// Builder method to set access time.
    pub fn with_accessed(mut self, time: SystemTime) -> Self {
        self.accessed = Some(time);
        self
    }

    /// Builder method to set attributes.
    pub fn with_attributes(mut self, attrs: FileAttributes) -> Self {
        self.attributes = attrs;
        self
    }

    /// Builder method to set the data set number.
    pub fn with_data_set(mut self, set: u16) -> Self {
        self.data_set = set;
        self
    }

    /// Validate the entry path for security.
    ///
    /// Returns an error if the path contains potentially dangerous components
    /// like ".." (parent directory traversal) or absolute paths.
    pub fn validate_path(&self) -> crate::error::Result<()> {
        use crate::error::MtfError;

        let path = std::path::Path::new(&self.name);

        if path.is_absolute() {
            return Err(MtfError::path_traversal(&self.name));
        }

        for component in path.components() {
            if let std::path::Component::ParentDir = component {
                return Err(MtfError::path_traversal(&self.name));
            }
        }

        Ok(())
    }

    /// Get a sanitized path that's safe for extraction.
    ///
    /// Drops root, `.` and `..` components and backslash-separated drive
    /// prefixes, keeping the remaining components in order.
    pub fn sanitized_name(&self) -> String {
        sanitize_path(&self.name)
    }
}

/// Sanitize a `/`- or `\`-separated path for use under an extraction root.
pub fn sanitize_path(name: &str) -> String {
    let mut result = String::new();

    for component in name.split(['/', '\\']) {
        match component {
            "" | "." | ".." => {}
            c if c.ends_with(':') && result.is_empty() => {
                // Drive prefix such as "C:"
            }
            c => {
                if !result.is_empty() {
                    result.push('/');
                }
                result.push_str(c);
            }
        }
    }

    result
}

impl Default for Entry {
    fn default() -> Self {
        Self::file("", 0)
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let type_char = match self.entry_type {
            EntryType::Directory => 'd',
            EntryType::File => '-',
        };
        write!(
            f,
            "{}{} {:>12} {:>5} {}",
            type_char,
            self.attributes.flags(),
            self.size,
            self.data_set,
            self.name
        )
    }
}
