//! Modification-time helpers shared by every freshness check.
//!
//! Timestamps are plain [`SystemTime`] values. A path whose metadata cannot
//! be read has no timestamp, which callers treat as "stale".

use std::path::Path;
use std::time::SystemTime;

/// Returns the last-modified time of `path`, following symlinks.
///
/// Returns `None` if the path does not exist, cannot be read, or the
/// platform does not report modification times.
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok()?.modified().ok()
}

/// Returns `true` if `path` is missing, unreadable, or was modified after
/// `timestamp`.
///
/// This is the negation of the file freshness rule
/// `exists(path) && mtime(path) <= timestamp`.
pub fn is_modified_after(path: &Path, timestamp: SystemTime) -> bool {
    match modified_time(path) {
        Some(mtime) => mtime > timestamp,
        None => true,
    }
}
