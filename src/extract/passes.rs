//! Extraction passes and cleanup
//!
//! One copy loop serves both sources. A key already present on disk is
//! skipped, which is what gives the override pass precedence: it runs
//! first, and the baseline pass then fills only the keys the patch
//! left out. Missing entries are skipped; any other I/O failure is
//! fatal and the caller wipes the cache.

use crate::archive::ArchiveReader;
use crate::error::{RescacheError, RescacheResult};
use crate::extract::freshness;
use crate::patch::{path_exists, PatchProvider};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Copy every resource key not already on disk from `source`
pub async fn extract_from(
    source: &dyn ArchiveReader,
    cache_dir: &Path,
    resources: &HashSet<String>,
    origin: &str,
) -> RescacheResult<()> {
    for key in resources {
        let output = cache_dir.join(key);
        if path_exists(&output).await {
            continue;
        }

        let Some(mut stream) = source.open(key).await? else {
            continue;
        };

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                RescacheError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }

        let mut file = fs::File::create(&output)
            .await
            .map_err(|e| RescacheError::io(format!("creating {}", output.display()), e))?;
        tokio::io::copy(&mut stream, &mut file)
            .await
            .map_err(|e| RescacheError::io(format!("writing {}", output.display()), e))?;
        file.flush()
            .await
            .map_err(|e| RescacheError::io(format!("flushing {}", output.display()), e))?;

        info!("Extracted {origin} resource {key}");
    }

    Ok(())
}

/// Run the override pass, a success no-op when no usable patch is installed
pub async fn extract_override(
    patch: Option<&dyn PatchProvider>,
    cache_dir: &Path,
    resources: &HashSet<String>,
) -> RescacheResult<()> {
    let Some(provider) = patch else {
        return Ok(());
    };

    let installed = provider.installed_path();
    if !path_exists(&installed).await {
        return Ok(());
    }

    let Some(manifest) = provider.read_manifest(&installed).await else {
        debug!("Installed patch {} has no readable manifest", installed.display());
        return Ok(());
    };
    if !provider.validate_manifest(&manifest) {
        // Obsolete patch, nothing to install from it.
        debug!("Installed patch {} failed manifest validation", installed.display());
        return Ok(());
    }

    let archive = provider.open_installed().await?;
    extract_from(archive.as_ref(), cache_dir, resources, "override").await
}

/// Best-effort wipe of every declared resource file and all token files
///
/// Individually missing files are fine; other deletion failures are
/// logged and skipped. Used both on staleness (before repopulating)
/// and on any extraction failure (so no partial cache survives).
pub async fn delete_files(cache_dir: &Path, resources: &HashSet<String>) {
    for key in resources {
        let path = cache_dir.join(key);
        match fs::remove_file(&path).await {
            Ok(()) => debug!("Deleted cached resource {key}"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => debug!("Could not delete {}: {}", path.display(), e),
        }
    }

    for name in freshness::list_token_files(cache_dir).await {
        let path = cache_dir.join(&name);
        if let Err(e) = fs::remove_file(&path).await {
            debug!("Could not delete token {}: {}", path.display(), e);
        }
    }
}
