//! Binary framing of a single cache artifact file.
//!
//! Each artifact is stored as `[u32 LE header length][bincode header][payload]`.
//! The header carries magic bytes, a format version, the producing crate
//! version and a checksum of the payload so that a truncated or foreign file
//! is recognized and treated as absent.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strata_common::ContentHash;

use crate::error::CacheError;

/// Magic bytes identifying a Strata cache artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"STRA";

/// Current artifact format version. Increment on breaking changes to
/// the header or payload format.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every artifact for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Magic bytes: must be `b"STRA"`.
    pub magic: [u8; 4],

    /// Artifact format version.
    pub format_version: u32,

    /// Crate version that produced this artifact.
    pub strata_version: String,

    /// Content hash of the payload.
    pub checksum: ContentHash,
}

/// One artifact file on disk.
#[derive(Debug, Clone)]
pub struct ArtifactFile {
    path: PathBuf,
}

impl ArtifactFile {
    /// Refers to the artifact at `path`. Nothing is read or created.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the artifact path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the artifact file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Writes `payload` with a fresh header and returns its checksum.
    ///
    /// The bytes go to a sibling temporary file which is then renamed over
    /// the artifact, so readers see either the old or the new file. Parent
    /// directories are created as needed.
    pub fn write(&self, payload: &[u8]) -> Result<ContentHash, CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
        }

        let checksum = ContentHash::from_bytes(payload);
        let header = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            strata_version: env!("CARGO_PKG_VERSION").to_string(),
            checksum,
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(CacheError::serialization)?;
        let header_len = u32::try_from(header_bytes.len()).map_err(CacheError::serialization)?;

        let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(payload);

        let tmp = self.temp_path();
        std::fs::write(&tmp, &output).map_err(|e| CacheError::io(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(CacheError::io(&self.path, e));
        }
        Ok(checksum)
    }

    /// Reads and validates the artifact, returning its payload.
    ///
    /// Returns `None` if the file is missing or fails validation. This is
    /// fail-safe: corruption results in a cache miss.
    pub fn read(&self) -> Option<Vec<u8>> {
        let raw = std::fs::read(&self.path).ok()?;
        match decode(&self.path, &raw) {
            Ok(payload) => Some(payload.to_vec()),
            Err(e) => {
                tracing::debug!(error = %e, "discarding unreadable artifact");
                None
            }
        }
    }

    /// Deletes the artifact. A missing file is not an error.
    pub fn remove(&self) -> Result<(), CacheError> {
        remove_if_exists(&self.path)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

/// Splits a raw artifact into header and payload and validates both.
fn decode<'a>(path: &Path, raw: &'a [u8]) -> Result<&'a [u8], CacheError> {
    let invalid = |reason: &str| CacheError::InvalidHeader {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let len_bytes: [u8; 4] = raw
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| invalid("missing header length"))?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    let header_bytes = raw
        .get(4..4 + header_len)
        .ok_or_else(|| invalid("truncated header"))?;

    let (header, _): (ArtifactHeader, usize) =
        bincode::serde::decode_from_slice(header_bytes, bincode::config::standard())
            .map_err(|e| invalid(&e.to_string()))?;

    if header.magic != ARTIFACT_MAGIC {
        return Err(invalid("wrong magic bytes"));
    }
    if header.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(CacheError::VersionMismatch {
            path: path.to_path_buf(),
            expected: ARTIFACT_FORMAT_VERSION,
            actual: header.format_version,
        });
    }

    let payload = &raw[4 + header_len..];
    let actual = ContentHash::from_bytes(payload);
    if actual != header.checksum {
        return Err(CacheError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: header.checksum.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(payload)
}

pub(crate) fn remove_if_exists(path: &Path) -> Result<(), CacheError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::io(path, e)),
    }
}
