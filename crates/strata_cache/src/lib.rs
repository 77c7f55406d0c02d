//! Persisted configuration caches with dependency-driven freshness.
//!
//! A [`ConfigCache`] owns one artifact file and its optional `.meta`
//! sidecar listing the [`Resource`](strata_resource::Resource)s the artifact
//! was built from. In debug mode those resources, plus any in-memory
//! dependencies, decide whether the artifact is still fresh; in production
//! mode an existing artifact is always fresh.
//!
//! A [`ConfigProvider`] layers lazy loading on top: it reads the artifact
//! when fresh and otherwise runs a producer, persists its result, and keeps
//! the value in memory.

#![warn(missing_docs)]

pub mod artifact;
pub mod config_cache;
pub mod container;
pub mod error;
pub mod metadata;
pub mod provider;

pub use artifact::ArtifactFile;
pub use config_cache::ConfigCache;
pub use container::ConfigContainer;
pub use error::CacheError;
pub use metadata::CacheMetadata;
pub use provider::ConfigProvider;
