//! Freshness-checkable dependencies of a cached artifact.
//!
//! [`CacheState`] is the single capability every dependency shares. The
//! persisted kinds are collected in the closed [`Resource`] enum so they can
//! be written to and read back from a cache's sidecar metadata; anything else
//! (for example another cache provider) only lives in memory.

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use strata_common::is_modified_after;

use crate::cumulative::CumulativeResource;

/// Something that can tell whether it still agrees with a cache written at
/// a given time.
pub trait CacheState {
    /// Returns `true` if nothing this state depends on changed after
    /// `timestamp`.
    fn is_cache_fresh(&self, timestamp: SystemTime) -> bool;
}

impl<S: CacheState + ?Sized> CacheState for &S {
    fn is_cache_fresh(&self, timestamp: SystemTime) -> bool {
        (**self).is_cache_fresh(timestamp)
    }
}

impl<S: CacheState + ?Sized> CacheState for Box<S> {
    fn is_cache_fresh(&self, timestamp: SystemTime) -> bool {
        (**self).is_cache_fresh(timestamp)
    }
}

impl<S: CacheState + ?Sized> CacheState for Rc<S> {
    fn is_cache_fresh(&self, timestamp: SystemTime) -> bool {
        (**self).is_cache_fresh(timestamp)
    }
}

impl<S: CacheState + ?Sized> CacheState for Arc<S> {
    fn is_cache_fresh(&self, timestamp: SystemTime) -> bool {
        (**self).is_cache_fresh(timestamp)
    }
}

/// A state that is mutably borrowed elsewhere is reported as stale.
impl<S: CacheState + ?Sized> CacheState for RefCell<S> {
    fn is_cache_fresh(&self, timestamp: SystemTime) -> bool {
        self.try_borrow()
            .is_ok_and(|state| state.is_cache_fresh(timestamp))
    }
}

/// A single tracked file.
///
/// Fresh iff the file exists and was last modified at or before the
/// reference timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    /// Tracks the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the tracked path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheState for FileResource {
    fn is_cache_fresh(&self, timestamp: SystemTime) -> bool {
        !is_modified_after(&self.path, timestamp)
    }
}

/// A whole directory tree, optionally narrowed to files whose name matches
/// a regular expression.
///
/// Fresh iff the directory still exists and neither it nor any nested
/// directory or matching file was modified after the reference timestamp.
/// Directories are always checked because adding or removing an entry
/// touches the parent's modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryResource {
    path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
}

impl DirectoryResource {
    /// Tracks every entry below `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pattern: None,
        }
    }

    /// Only tracks files whose name matches the regular expression `pattern`.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Returns the tracked directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file name filter, if any.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }
}

impl CacheState for DirectoryResource {
    fn is_cache_fresh(&self, timestamp: SystemTime) -> bool {
        if !self.path.is_dir() || is_modified_after(&self.path, timestamp) {
            return false;
        }
        let filter = match self.pattern.as_deref().map(regex::Regex::new).transpose() {
            Ok(filter) => filter,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "invalid directory resource pattern");
                return false;
            }
        };

        for entry in walkdir::WalkDir::new(&self.path).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(path = %self.path.display(), error = %e, "directory walk failed");
                    return false;
                }
            };
            let is_dir = entry.file_type().is_dir();
            if !is_dir {
                if let Some(ref re) = filter {
                    if !re.is_match(&entry.file_name().to_string_lossy()) {
                        continue;
                    }
                }
            }
            let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
            match modified {
                Some(mtime) if mtime <= timestamp => {}
                _ => return false,
            }
        }
        true
    }
}

/// A dependency that can be persisted in a cache's sidecar metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    /// A single file.
    File(FileResource),
    /// A directory tree.
    Directory(DirectoryResource),
    /// Files discovered by folder content loaders across layered roots.
    Cumulative(CumulativeResource),
}

impl CacheState for Resource {
    fn is_cache_fresh(&self, timestamp: SystemTime) -> bool {
        match self {
            Self::File(r) => r.is_cache_fresh(timestamp),
            Self::Directory(r) => r.is_cache_fresh(timestamp),
            Self::Cumulative(r) => r.is_cache_fresh(timestamp),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(r) => write!(f, "file {}", r.path.display()),
            Self::Directory(r) => write!(f, "directory {}", r.path.display()),
            Self::Cumulative(r) => write!(f, "cumulative resource '{}'", r.name()),
        }
    }
}

impl From<FileResource> for Resource {
    fn from(r: FileResource) -> Self {
        Self::File(r)
    }
}

impl From<DirectoryResource> for Resource {
    fn from(r: DirectoryResource) -> Self {
        Self::Directory(r)
    }
}

impl From<CumulativeResource> for Resource {
    fn from(r: CumulativeResource) -> Self {
        Self::Cumulative(r)
    }
}
