//! Blob store abstraction over resource archives
//!
//! Both the baseline bundle and an installed patch archive are read
//! through the same interface: an opaque store of byte streams keyed
//! by relative path. How the bytes are laid out on disk is the
//! implementation's business.

mod dir;

pub use dir::DirArchive;

use crate::error::RescacheResult;
use async_trait::async_trait;
use tokio::io::AsyncRead;

/// Entry stream handed out by an archive
pub type EntryStream = Box<dyn AsyncRead + Send + Unpin>;

/// Read-only access to archive entries by exact key
///
/// A missing entry is not an error: `open` returns `Ok(None)` so the
/// extractor can skip it and move on. Any other failure is a real I/O
/// error and fatal to the extraction cycle.
#[async_trait]
pub trait ArchiveReader: Send + Sync {
    /// Open the entry at `key`, or `None` if the archive has no such entry
    async fn open(&self, key: &str) -> RescacheResult<Option<EntryStream>>;
}
