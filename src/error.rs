//! Error types for rescache
//!
//! All modules use `RescacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rescache operations
pub type RescacheResult<T> = Result<T, RescacheError>;

/// All errors that can occur in rescache
#[derive(Error, Debug)]
pub enum RescacheError {
    // Extraction errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Patch errors
    #[error("Failed to graduate patch {path}: {reason}")]
    Graduation { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Metadata errors
    #[error("Package metadata unavailable")]
    MetadataUnavailable,
}

impl RescacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a graduation error
    pub fn graduation(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Graduation {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
