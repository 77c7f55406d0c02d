//! Layered directory resolution and resource freshness tracking.
//!
//! A [`FolderContentLoader`] discovers files under a relative path across a
//! base root and an optional override root, where the override root wins on
//! every relative-path collision. The files it finds are recorded in a
//! [`CumulativeResource`], which can later answer whether the scanned scope
//! still matches the file system without a full rescan.
//!
//! Every dependency a cached artifact may have implements [`CacheState`].

#![warn(missing_docs)]

pub mod container;
pub mod cumulative;
pub mod error;
pub mod info;
pub mod loader;
pub mod matcher;
pub mod resource;

pub use container::ResourcesContainer;
pub use cumulative::{CumulativeConfigLoader, CumulativeResource, ResourceRoot};
pub use error::MatcherError;
pub use info::{CumulativeResourceInfo, FolderContent, FolderTree};
pub use loader::{FolderContentLoader, UNLIMITED_DEPTH};
pub use matcher::{ByFileNameMatcher, FileMatcher};
pub use resource::{CacheState, DirectoryResource, FileResource, Resource};
