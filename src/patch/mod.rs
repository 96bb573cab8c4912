//! Patch archive access and graduation
//!
//! A patch archive lives in one of two path states: *downloaded*
//! (fetched by the external downloader, not yet trusted) and
//! *installed* (active, consumed by extraction). Graduation promotes
//! downloaded to installed exactly once; the rename is the atomicity
//! boundary, and any failure before it completes leaves the previous
//! installed archive untouched.

mod dir_provider;
mod manifest;

pub use dir_provider::DirPatchProvider;
pub use manifest::PatchManifest;

use crate::archive::ArchiveReader;
use crate::error::{RescacheError, RescacheResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Access to the patch archive pair and its manifest
///
/// The installation lock is shared with the downloader: the extraction
/// cycle holds it from graduation through the last pass so the
/// downloader never replaces an archive mid-read, and this engine never
/// reads a half-written one.
#[async_trait]
pub trait PatchProvider: Send + Sync {
    /// Path of a freshly downloaded archive awaiting graduation
    fn downloaded_path(&self) -> PathBuf;

    /// Path of the active archive consumed by extraction
    fn installed_path(&self) -> PathBuf;

    /// Read the manifest travelling with the archive at `archive`
    ///
    /// `None` means missing or unparseable; the archive is then treated
    /// as obsolete and ignored.
    async fn read_manifest(&self, archive: &Path) -> Option<PatchManifest>;

    /// Whether a manifest marks its archive as usable
    fn validate_manifest(&self, manifest: &PatchManifest) -> bool;

    /// Remove the installed archive to make room for a replacement
    ///
    /// Called by graduation only when `installed_path()` exists; a
    /// failure aborts the cycle with the previous archive still in
    /// place.
    async fn remove_installed(&self) -> std::io::Result<()>;

    /// Open the installed archive as a blob store
    async fn open_installed(&self) -> RescacheResult<Box<dyn ArchiveReader>>;

    /// Mutual-exclusion handle shared with the downloader
    fn installation_lock(&self) -> Arc<Mutex<()>>;
}

/// Promote a downloaded patch archive to installed status
///
/// No-op when nothing is downloaded or its manifest fails validation
/// (the download stays in place for the downloader to retry or
/// replace). A valid download replaces the installed archive by
/// delete-then-rename; failure of either step is returned as a
/// [`RescacheError::Graduation`] and must abort the cycle before any
/// extraction runs.
pub async fn graduate_downloaded_patch(provider: &dyn PatchProvider) -> RescacheResult<()> {
    let downloaded = provider.downloaded_path();
    if !path_exists(&downloaded).await {
        return Ok(());
    }

    let Some(manifest) = provider.read_manifest(&downloaded).await else {
        debug!("Downloaded patch {} has no readable manifest", downloaded.display());
        return Ok(());
    };
    if !provider.validate_manifest(&manifest) {
        debug!("Downloaded patch {} failed manifest validation", downloaded.display());
        return Ok(());
    }

    let installed = provider.installed_path();
    if path_exists(&installed).await {
        provider
            .remove_installed()
            .await
            .map_err(|e| RescacheError::graduation(&installed, format!("delete failed: {e}")))?;
    }

    fs::rename(&downloaded, &installed)
        .await
        .map_err(|e| RescacheError::graduation(&installed, format!("rename failed: {e}")))?;

    info!("Graduated patch {} -> {}", downloaded.display(), installed.display());
    Ok(())
}

pub(crate) async fn path_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}
