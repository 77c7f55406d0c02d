//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while reading, writing or building a cache.
///
/// Freshness checks never surface these: a cache that cannot be read is
/// simply stale and gets rebuilt. They are returned from the operations that
/// must succeed for the cache to be usable at all (writing an artifact,
/// removing it, or producing a value of the wrong shape).
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An artifact file has an invalid or missing header.
    #[error("invalid artifact header in {path}: {reason}")]
    InvalidHeader {
        /// The artifact file path.
        path: PathBuf,
        /// Description of the header problem.
        reason: String,
    },

    /// The stored checksum does not match the computed checksum of the payload.
    #[error("checksum mismatch in {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The artifact file path.
        path: PathBuf,
        /// The checksum recorded in the header.
        expected: String,
        /// The checksum computed from the payload.
        actual: String,
    },

    /// An artifact or sidecar was written with another format version.
    #[error("version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The file path.
        path: PathBuf,
        /// The format version this build understands.
        expected: u32,
        /// The format version found in the file.
        actual: u32,
    },

    /// A value could not be encoded or decoded.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// A producer returned something other than a container value.
    #[error("The config \"{}\" is not valid. Expected a container.", path.display())]
    InvalidConfig {
        /// The artifact path of the offending cache.
        path: PathBuf,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn serialization(reason: impl ToString) -> Self {
        Self::Serialization {
            reason: reason.to_string(),
        }
    }
}
