//! rescache - On-Disk Resource Cache Engine
//!
//! Keeps a writable cache directory populated with resource files
//! extracted from a read-only baseline bundle, optionally overridden
//! by a downloaded patch archive. Warm starts are detected through a
//! freshness token and skip all extraction work; any failure wipes the
//! cache so the next start re-extracts from scratch.

pub mod archive;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod patch;

pub use archive::{ArchiveReader, DirArchive};
pub use error::{RescacheError, RescacheResult};
pub use extract::ResourceExtractor;
pub use metadata::{PackageInfo, PackageMetadata, StaticPackageMetadata};
pub use patch::{DirPatchProvider, PatchManifest, PatchProvider};
