//! Filesystem-backed patch provider
//!
//! Archives are directory blob stores laid out next to each other under
//! a patch root: `<root>/patch.download` awaiting graduation and
//! `<root>/patch` once active. The manifest is the `manifest.json`
//! entry inside the archive.

use crate::archive::{ArchiveReader, DirArchive};
use crate::error::RescacheResult;
use crate::patch::{PatchManifest, PatchProvider};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

const INSTALLED_NAME: &str = "patch";
const DOWNLOADED_NAME: &str = "patch.download";
const MANIFEST_ENTRY: &str = "manifest.json";

/// Patch provider over a directory of archive directories
#[derive(Debug, Clone)]
pub struct DirPatchProvider {
    downloaded: PathBuf,
    installed: PathBuf,
    expected_build: Option<String>,
    lock: Arc<Mutex<()>>,
}

impl DirPatchProvider {
    /// Provider rooted at `root`, accepting any parseable manifest
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            downloaded: root.join(DOWNLOADED_NAME),
            installed: root.join(INSTALLED_NAME),
            expected_build: None,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Require manifests to carry this `buildNumber` to validate
    pub fn with_expected_build(mut self, build: impl Into<String>) -> Self {
        self.expected_build = Some(build.into());
        self
    }

    /// Override where downloads are staged
    pub fn with_downloaded_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.downloaded = path.into();
        self
    }

    /// Share an existing installation lock (the downloader's)
    pub fn with_installation_lock(mut self, lock: Arc<Mutex<()>>) -> Self {
        self.lock = lock;
        self
    }
}

#[async_trait]
impl PatchProvider for DirPatchProvider {
    fn downloaded_path(&self) -> PathBuf {
        self.downloaded.clone()
    }

    fn installed_path(&self) -> PathBuf {
        self.installed.clone()
    }

    async fn read_manifest(&self, archive: &Path) -> Option<PatchManifest> {
        let path = archive.join(MANIFEST_ENTRY);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Could not read manifest {}: {}", path.display(), e);
                return None;
            }
        };

        match PatchManifest::parse(&bytes) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!("Could not parse manifest {}: {}", path.display(), e);
                None
            }
        }
    }

    fn validate_manifest(&self, manifest: &PatchManifest) -> bool {
        match &self.expected_build {
            Some(expected) => manifest.build_number.as_deref() == Some(expected.as_str()),
            None => true,
        }
    }

    async fn remove_installed(&self) -> std::io::Result<()> {
        // Archives are directories here, but tolerate a plain file too.
        match fs::metadata(&self.installed).await {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&self.installed).await,
            Ok(_) => fs::remove_file(&self.installed).await,
            Err(e) => Err(e),
        }
    }

    async fn open_installed(&self) -> RescacheResult<Box<dyn ArchiveReader>> {
        Ok(Box::new(DirArchive::new(&self.installed)))
    }

    fn installation_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.lock)
    }
}
