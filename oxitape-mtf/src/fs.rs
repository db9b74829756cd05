//! Filesystem destination.
//!
//! Materialises directories and files under an extraction root and restores
//! modification and access times with `filetime`.

use filetime::FileTime;
use oxitape_core::error::{MtfError, Result};
use oxitape_core::{Destination, Entry};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

/// Extracts into a directory on the local filesystem.
#[derive(Debug)]
pub struct FsDestination {
    root: PathBuf,
    preserve_times: bool,
}

impl FsDestination {
    /// Extract under `root`, which must be an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let display = root.display().to_string();
        let meta = fs::metadata(&root).map_err(|e| MtfError::destination(&display, e))?;
        if !meta.is_dir() {
            return Err(MtfError::destination(
                display,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }

        Ok(Self {
            root,
            preserve_times: true,
        })
    }

    /// Whether to restore timestamps after writing each file.
    pub fn preserve_times(mut self, preserve: bool) -> Self {
        self.preserve_times = preserve;
        self
    }

    /// The extraction root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !safe {
            return Err(MtfError::path_traversal(path));
        }
        Ok(self.root.join(relative))
    }
}

impl Destination for FsDestination {
    type Writer = BufWriter<File>;

    fn create_dir(&mut self, path: &str) -> Result<()> {
        let target = self.target(path)?;
        fs::create_dir_all(&target).map_err(|e| MtfError::destination(path, e))
    }

    fn create_file(&mut self, path: &str) -> Result<Self::Writer> {
        let target = self.target(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| MtfError::destination(path, e))?;
        }
        let file = File::create(&target).map_err(|e| MtfError::destination(path, e))?;
        Ok(BufWriter::new(file))
    }

    fn finish_file(&mut self, path: &str, writer: Self::Writer, entry: &Entry) -> Result<()> {
        let mut writer = writer;
        writer.flush().map_err(|e| MtfError::destination(path, e))?;
        drop(writer);

        if !self.preserve_times {
            return Ok(());
        }

        let (mtime, atime) = match (entry.modified, entry.accessed) {
            (Some(m), Some(a)) => (m, a),
            (Some(t), None) | (None, Some(t)) => (t, t),
            (None, None) => return Ok(()),
        };

        let target = self.target(path)?;
        filetime::set_file_times(
            &target,
            FileTime::from_system_time(atime),
            FileTime::from_system_time(mtime),
        )
        .map_err(|e| MtfError::destination(path, e))
    }
}
