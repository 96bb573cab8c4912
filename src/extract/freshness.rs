//! Cache freshness tokens
//!
//! A single token file in the cache directory encodes where the cached
//! resources came from: the application's version code and last-update
//! time, plus the installed patch's number and mtime when one is
//! active. The cache is fresh exactly when one token file exists and
//! its name matches the expected token; everything else means stale.

use crate::metadata::{PackageInfo, PackageMetadata};
use crate::patch::{path_exists, PatchProvider};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tokio::fs;
use tracing::{info, warn};

/// Filename prefix of freshness token files
pub const TOKEN_PREFIX: &str = "res_timestamp-";

/// Outcome of the freshness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// Cache matches the expected token, no extraction needed
    Fresh,
    /// Cache must be wiped and repopulated; carries the token to write
    /// once extraction succeeds
    Stale(String),
}

impl Freshness {
    /// Whether the cache can be used as-is
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// Check the cache directory against the token it should carry
///
/// Unavailable package metadata short-circuits to stale with the bare
/// prefix as the token, without consulting existing files: the cache
/// is re-extracted on every start until metadata comes back.
pub async fn check(
    dir: &Path,
    metadata: &dyn PackageMetadata,
    patch: Option<&dyn PatchProvider>,
) -> Freshness {
    let info = match metadata.package_info() {
        Ok(info) => info,
        Err(e) => {
            warn!("Package metadata unavailable ({e}), forcing re-extraction");
            return Freshness::Stale(TOKEN_PREFIX.to_string());
        }
    };

    let expected = expected_token(info, patch).await;
    evaluate(&list_token_files(dir).await, &expected)
}

/// Build the token for the given package info and installed patch
pub async fn expected_token(info: PackageInfo, patch: Option<&dyn PatchProvider>) -> String {
    let mut token = format!("{TOKEN_PREFIX}{}-{}", info.version_code, info.last_update_time);

    if let Some(provider) = patch {
        let installed = provider.installed_path();
        if path_exists(&installed).await {
            if let Some(manifest) = provider.read_manifest(&installed).await {
                if provider.validate_manifest(&manifest) {
                    let mtime = mtime_millis(&installed).await;
                    match &manifest.patch_number {
                        Some(number) => token.push_str(&format!("-{number}-{mtime}")),
                        None => token.push_str(&format!("-{mtime}")),
                    }
                }
            }
        }
    }

    token
}

/// Names of token-prefixed files in `dir`
///
/// A missing or unreadable directory yields an empty list, which the
/// check treats as stale.
pub async fn list_token_files(dir: &Path) -> Vec<String> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut names = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        if let Ok(name) = entry.file_name().into_string() {
            if name.starts_with(TOKEN_PREFIX) {
                names.push(name);
            }
        }
    }
    names
}

/// Judge freshness from the existing token files and the expected token
pub fn evaluate(existing: &[String], expected: &str) -> Freshness {
    if existing.is_empty() {
        info!("No extracted resources found");
        return Freshness::Stale(expected.to_string());
    }

    if existing.len() == 1 {
        info!("Found extracted resources {}", existing[0]);
    }

    if existing.len() != 1 || existing[0] != expected {
        info!("Resource version mismatch, expected {expected}");
        return Freshness::Stale(expected.to_string());
    }

    Freshness::Fresh
}

/// File modification time as epoch milliseconds, 0 when unknown
async fn mtime_millis(path: &Path) -> u128 {
    match fs::metadata(path).await {
        Ok(meta) => meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis())
            .unwrap_or(0),
        Err(_) => 0,
    }
}
