//! Sidecar metadata recording what an artifact was built from.
//!
//! The sidecar sits next to the artifact as `<artifact>.meta` and is a JSON
//! document listing the persisted [`Resource`]s. It only exists for caches
//! written in debug mode with at least one resource.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use strata_resource::{CacheState, Resource};

use crate::artifact::remove_if_exists;
use crate::error::CacheError;

/// Suffix appended to the artifact file name.
const METADATA_SUFFIX: &str = ".meta";

/// Current sidecar format version.
const METADATA_FORMAT_VERSION: u32 = 1;

/// Persisted resource list of one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Sidecar format version. Other versions are treated as corrupt.
    pub format_version: u32,

    /// Resources the artifact depends on, in registration order.
    pub resources: Vec<Resource>,
}

impl CacheMetadata {
    /// Creates sidecar metadata for the given resources.
    pub fn new(resources: Vec<Resource>) -> Self {
        Self {
            format_version: METADATA_FORMAT_VERSION,
            resources,
        }
    }

    /// Returns the sidecar path for an artifact.
    pub fn path_for(artifact: &Path) -> PathBuf {
        let mut name = OsString::from(artifact.as_os_str());
        name.push(METADATA_SUFFIX);
        PathBuf::from(name)
    }

    /// Loads the sidecar of `artifact`.
    ///
    /// Returns `Ok(None)` when there is no sidecar, which is a valid state.
    /// A sidecar that exists but cannot be decoded is an error.
    pub fn load(artifact: &Path) -> Result<Option<Self>, CacheError> {
        let path = Self::path_for(artifact);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(path, e)),
        };
        let metadata: Self = serde_json::from_str(&content).map_err(CacheError::serialization)?;
        if metadata.format_version != METADATA_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                path,
                expected: METADATA_FORMAT_VERSION,
                actual: metadata.format_version,
            });
        }
        Ok(Some(metadata))
    }

    /// Writes the sidecar of `artifact`.
    pub fn save(&self, artifact: &Path) -> Result<(), CacheError> {
        Self::save_encoded(artifact, &self.encode()?)
    }

    /// Encodes the sidecar without touching the file system.
    pub(crate) fn encode(&self) -> Result<String, CacheError> {
        serde_json::to_string_pretty(self).map_err(CacheError::serialization)
    }

    pub(crate) fn save_encoded(artifact: &Path, json: &str) -> Result<(), CacheError> {
        let path = Self::path_for(artifact);
        std::fs::write(&path, json).map_err(|e| CacheError::io(path, e))
    }

    /// Deletes the sidecar of `artifact` if there is one.
    pub fn remove(artifact: &Path) -> Result<(), CacheError> {
        remove_if_exists(&Self::path_for(artifact))
    }

    /// Returns `true` if every resource is fresh, stopping at the first
    /// stale one.
    pub fn is_fresh(&self, timestamp: SystemTime) -> bool {
        match self.resources.iter().find(|r| !r.is_cache_fresh(timestamp)) {
            Some(stale) => {
                tracing::debug!(resource = %stale, "stale resource");
                false
            }
            None => true,
        }
    }
}
