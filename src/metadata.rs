//! Application package metadata
//!
//! The freshness token is derived from the installed application's
//! version code and last-update time. Lookup may fail (package manager
//! unavailable, metadata store corrupt); callers treat that as "cache
//! definitely stale" rather than an error.

use crate::error::RescacheResult;

/// Version information for the installed application package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageInfo {
    /// Monotonically increasing version code
    pub version_code: i64,
    /// Last package update time, epoch milliseconds
    pub last_update_time: i64,
}

/// Source of the application's package metadata
pub trait PackageMetadata: Send + Sync {
    /// Look up the current package info
    ///
    /// Returns `Err(RescacheError::MetadataUnavailable)` when the
    /// lookup fails; the freshness check then forces re-extraction.
    fn package_info(&self) -> RescacheResult<PackageInfo>;
}

/// Fixed package metadata, injected at construction
///
/// Hosts that already know their version at startup use this; tests
/// use it to simulate upgrades and missing metadata.
#[derive(Debug, Clone)]
pub struct StaticPackageMetadata {
    info: Option<PackageInfo>,
}

impl StaticPackageMetadata {
    /// Metadata with the given version code and last-update time
    pub fn new(version_code: i64, last_update_time: i64) -> Self {
        Self {
            info: Some(PackageInfo {
                version_code,
                last_update_time,
            }),
        }
    }

    /// Metadata whose lookup always fails
    pub fn unavailable() -> Self {
        Self { info: None }
    }
}

impl PackageMetadata for StaticPackageMetadata {
    fn package_info(&self) -> RescacheResult<PackageInfo> {
        self.info.ok_or(crate::error::RescacheError::MetadataUnavailable)
    }
}
