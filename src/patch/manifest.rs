//! Patch manifest parsing
//!
//! Every patch archive travels with a JSON manifest. Only two fields
//! matter to the cache engine: `patchNumber` (makes the freshness token
//! more specific) and `buildNumber` (consulted by providers that pin a
//! patch to an application build). Everything else is carried through
//! untouched.

use crate::error::RescacheResult;
use serde::{Deserialize, Serialize};

/// Parsed patch manifest
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PatchManifest {
    /// Sequence number of this patch, if the server assigned one
    #[serde(rename = "patchNumber", default, skip_serializing_if = "Option::is_none")]
    pub patch_number: Option<String>,

    /// Application build the patch was produced against
    #[serde(rename = "buildNumber", default, skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,

    /// Fields this engine does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PatchManifest {
    /// Parse a manifest from raw JSON bytes
    pub fn parse(bytes: &[u8]) -> RescacheResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
