//! A single persisted artifact and the state deciding its freshness.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use strata_common::modified_time;
use strata_resource::{CacheState, Resource};

use crate::artifact::ArtifactFile;
use crate::error::CacheError;
use crate::metadata::CacheMetadata;

/// A cache file plus its dependency graph.
///
/// In production mode an existing artifact is always fresh and no sidecar is
/// ever written. In debug mode the artifact is fresh only while every
/// resource recorded in its sidecar, followed by every in-memory dependency,
/// is fresh against the artifact's own modification time. Evaluation stops
/// at the first stale entry.
pub struct ConfigCache {
    artifact: ArtifactFile,
    debug: bool,
    dependencies: Vec<Box<dyn CacheState>>,
}

impl ConfigCache {
    /// Creates a cache backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>, debug: bool) -> Self {
        Self {
            artifact: ArtifactFile::new(path),
            debug,
            dependencies: Vec::new(),
        }
    }

    /// Returns the artifact path.
    pub fn path(&self) -> &Path {
        self.artifact.path()
    }

    /// Returns `true` in debug mode, where dependencies are tracked.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Adds a state that must also be fresh for this cache to be fresh.
    ///
    /// Dependencies live only in memory and are consulted after the
    /// persisted resources, in the order they were added.
    pub fn add_dependency(&mut self, dependency: impl CacheState + 'static) {
        self.dependencies.push(Box::new(dependency));
    }

    /// Returns the artifact's modification time, or `None` if there is no
    /// artifact.
    pub fn timestamp(&self) -> Option<SystemTime> {
        if !self.artifact.exists() {
            return None;
        }
        modified_time(self.artifact.path())
    }

    /// Returns `true` if the artifact exists and, in debug mode, nothing it
    /// depends on changed since it was written.
    pub fn is_fresh(&self) -> bool {
        let Some(timestamp) = self.timestamp() else {
            return false;
        };
        if !self.debug {
            return true;
        }

        match CacheMetadata::load(self.path()) {
            Ok(Some(metadata)) => {
                if !metadata.is_fresh(timestamp) {
                    return false;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "unreadable cache metadata, treating cache as stale");
                return false;
            }
        }

        let fresh = self
            .dependencies
            .iter()
            .all(|dependency| dependency.is_cache_fresh(timestamp));
        if !fresh {
            tracing::debug!(path = %self.path().display(), "cache dependency is stale");
        }
        fresh
    }

    /// Writes `content` as the new artifact.
    ///
    /// In debug mode a non-empty `resources` list replaces the sidecar;
    /// otherwise any previous sidecar is removed so that it can never
    /// describe a newer artifact. The sidecar is encoded first: when it
    /// cannot be, nothing is written.
    pub fn write(&self, content: &[u8], resources: &[Resource]) -> Result<(), CacheError> {
        let sidecar = if self.debug && !resources.is_empty() {
            Some(CacheMetadata::new(resources.to_vec()).encode()?)
        } else {
            None
        };

        self.artifact.write(content)?;
        match sidecar {
            Some(json) => CacheMetadata::save_encoded(self.path(), &json)?,
            None => CacheMetadata::remove(self.path())?,
        }
        tracing::debug!(
            path = %self.path().display(),
            bytes = content.len(),
            resources = resources.len(),
            "cache written"
        );
        Ok(())
    }

    /// Reads the artifact payload, or `None` if it is missing or corrupt.
    pub fn read(&self) -> Option<Vec<u8>> {
        self.artifact.read()
    }

    /// Deletes the artifact and its sidecar.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.artifact.remove()?;
        CacheMetadata::remove(self.path())
    }
}

impl std::fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigCache")
            .field("path", &self.path())
            .field("debug", &self.debug)
            .field("dependencies", &self.dependencies.len())
            .finish()
    }
}
