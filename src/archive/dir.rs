//! Directory-tree-backed archive
//!
//! Serves entries straight from a directory, with keys resolved as
//! relative paths under the root. Used for both unpacked baseline
//! bundles and installed patch archives.

use crate::archive::{ArchiveReader, EntryStream};
use crate::error::{RescacheError, RescacheResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Archive reader over a plain directory tree
#[derive(Debug, Clone)]
pub struct DirArchive {
    root: PathBuf,
}

impl DirArchive {
    /// Create a reader rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this archive reads from
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArchiveReader for DirArchive {
    async fn open(&self, key: &str) -> RescacheResult<Option<EntryStream>> {
        let path = self.root.join(key);
        match File::open(&path).await {
            Ok(file) => Ok(Some(Box::new(file) as EntryStream)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RescacheError::io(
                format!("opening archive entry {}", path.display()),
                e,
            )),
        }
    }
}
