//! Local disk storage.
//!
//! Items are plain files; siblings are created in the parent directory of
//! the originating file.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::{ReadStream, StorageItem, WriteStream};
use crate::core::cancel::{CancelToken, Cancellable};

/// A file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    cancel: CancelToken,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>, cancel: CancelToken) -> Self {
        Self {
            path: path.into(),
            cancel,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory siblings are created in.
    fn scope(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl StorageItem for LocalFile {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn length(&self) -> io::Result<u64> {
        self.cancel.check()?;
        Ok(fs::metadata(&self.path)?.len())
    }

    fn open_for_read(&self) -> io::Result<ReadStream> {
        self.cancel.check()?;
        trace!(path = %self.path.display(), "opening for read");
        let file = File::open(&self.path)?;
        Ok(Box::new(Cancellable::new(file, self.cancel.clone())))
    }

    fn open_for_write(&self) -> io::Result<WriteStream> {
        self.cancel.check()?;
        trace!(path = %self.path.display(), "opening for write");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        Ok(Box::new(Cancellable::new(file, self.cancel.clone())))
    }

    fn create_sibling(
        &self,
        prefix: &str,
        suffix: &str,
        _size_hint: u64,
    ) -> io::Result<Box<dyn StorageItem>> {
        self.cancel.check()?;
        let (_, path) = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(self.scope())?
            .keep()?;
        trace!(path = %path.display(), "created sibling");
        Ok(Box::new(LocalFile::new(path, self.cancel.clone())))
    }

    fn delete(self: Box<Self>) -> io::Result<()> {
        fs::remove_file(&self.path)
    }
}
