//! Folder content discovery across a base root and an override root.
//!
//! Both roots are walked in lock-step, one relative directory at a time. At
//! each level a matched file in the override root hides the base root's file
//! with the same name, so the override relation holds independently at every
//! nesting level.
//!
//! Nesting levels count from 1 for the files directly inside the scanned
//! directory. With `max_depth = N` only files at levels `1..=N` are kept and
//! directories whose files could not be kept are never listed.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use strata_common::is_modified_after;

use crate::cumulative::CumulativeResource;
use crate::info::{sort_lexically, CumulativeResourceInfo, FolderContent, FolderTree};
use crate::matcher::{ByFileNameMatcher, FileMatcher};

/// `max_depth` value that disables the nesting limit.
pub const UNLIMITED_DEPTH: i32 = -1;

/// Prefix of every folder content loader's resource name.
const RESOURCE_NAME_PREFIX: &str = "Folder content: ";

/// Discovers the files under one relative path of every root it is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderContentLoader {
    relative_path: String,
    max_depth: i32,
    flat: bool,
    matcher: ByFileNameMatcher,
}

/// One directory's immediate children, split by kind and sorted by name.
#[derive(Debug, Default)]
struct DirListing {
    files: Vec<OsString>,
    dirs: Vec<OsString>,
}

/// Why a bounded rescan considers the tracked scope out of date.
enum ScopeChange {
    Added(PathBuf),
    DirectoryRemoved(PathBuf),
}

impl fmt::Display for ScopeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added(path) => write!(f, "untracked match {}", path.display()),
            Self::DirectoryRemoved(path) => write!(f, "directory {} removed", path.display()),
        }
    }
}

/// Successful scan of the layered scope.
struct Scan {
    path: PathBuf,
    tree: FolderTree,
}

impl FolderContentLoader {
    /// Creates a loader for `relative_path`.
    ///
    /// `max_depth` bounds the nesting level of kept files
    /// ([`UNLIMITED_DEPTH`] for no bound). `flat` selects a sorted file list
    /// instead of a per-directory tree.
    pub fn new(
        relative_path: impl Into<String>,
        max_depth: i32,
        flat: bool,
        matcher: ByFileNameMatcher,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            max_depth,
            flat,
            matcher,
        }
    }

    /// Returns the scanned path relative to each root.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Returns the nesting limit.
    pub fn max_depth(&self) -> i32 {
        self.max_depth
    }

    /// Returns `true` if results are produced as a flat list.
    pub fn is_flat(&self) -> bool {
        self.flat
    }

    /// Returns the file matcher.
    pub fn matcher(&self) -> &ByFileNameMatcher {
        &self.matcher
    }

    /// Returns the logical name found files are tracked under.
    pub fn resource_name(&self) -> String {
        format!("{RESOURCE_NAME_PREFIX}{}", self.relative_path)
    }

    /// Scans `base` and `override_root` for the loader's relative path.
    ///
    /// Returns `None` when neither root contains the relative path as a
    /// directory, which means there is nothing to track rather than an
    /// error. An unreadable directory is logged and also yields `None`.
    pub fn load(
        &self,
        group: &str,
        base: &Path,
        override_root: Option<&Path>,
    ) -> Option<CumulativeResourceInfo> {
        self.scan(base, override_root)
            .map(|scan| self.to_info(group, scan))
    }

    /// Records every file this loader finds for `group` in `resource`.
    pub fn register_found_resource(
        &self,
        group: &str,
        base: &Path,
        override_root: Option<&Path>,
        resource: &mut CumulativeResource,
    ) {
        let found = self
            .scan(base, override_root)
            .map(|scan| scan.tree.flatten())
            .unwrap_or_default();
        resource.add_found(group, &self.resource_name(), found);
    }

    /// Loads and registers with a single scan.
    pub fn load_and_register(
        &self,
        group: &str,
        base: &Path,
        override_root: Option<&Path>,
        resource: &mut CumulativeResource,
    ) -> Option<CumulativeResourceInfo> {
        let scan = self.scan(base, override_root);
        let found = scan
            .as_ref()
            .map(|scan| scan.tree.clone().flatten())
            .unwrap_or_default();
        resource.add_found(group, &self.resource_name(), found);
        scan.map(|scan| self.to_info(group, scan))
    }

    /// Checks whether the files tracked for `group` still describe the
    /// current state of the scope.
    ///
    /// Stale when a tracked file is gone or modified after `timestamp`, when
    /// a directory that held tracked files is gone, or when a file the scan
    /// would now keep is not tracked. Only directories that held tracked
    /// files are listed; any other sub-directory reached from them gets a
    /// bounded scan of its own, so a new directory holding a matching file
    /// is caught while an empty new directory is not a change. I/O errors
    /// make the scope stale.
    pub fn is_resource_fresh(
        &self,
        group: &str,
        base: &Path,
        override_root: Option<&Path>,
        resource: &CumulativeResource,
        timestamp: SystemTime,
    ) -> bool {
        let name = self.resource_name();
        let tracked = match resource.found(group, &name) {
            Some(tracked) if !tracked.is_empty() => tracked,
            _ => {
                // Nothing was found at load time; fresh while that still holds.
                return match self.scan_layers(base, override_root) {
                    Ok(scan) => scan.map_or(true, |scan| scan.tree.is_empty()),
                    Err(e) => {
                        tracing::debug!(group, resource = %name, error = %e, "rescan failed");
                        false
                    }
                };
            }
        };

        if let Some(path) = tracked
            .iter()
            .find(|path| is_modified_after(path, timestamp))
        {
            tracing::debug!(group, path = %path.display(), "tracked file removed or modified");
            return false;
        }

        let base_dir = base.join(&self.relative_path);
        let override_dir = override_root.map(|root| root.join(&self.relative_path));
        let scope = tracked_directories(tracked, &base_dir, override_dir.as_deref());

        match self.find_scope_change(&base_dir, override_dir.as_deref(), tracked, &scope) {
            Ok(None) => true,
            Ok(Some(change)) => {
                tracing::debug!(group, resource = %name, %change, "folder content changed");
                false
            }
            Err(e) => {
                tracing::debug!(group, resource = %name, error = %e, "bounded rescan failed");
                false
            }
        }
    }

    fn to_info(&self, group: &str, scan: Scan) -> CumulativeResourceInfo {
        let data = if self.flat {
            FolderContent::Flat(scan.tree.flatten())
        } else {
            FolderContent::Tree(scan.tree)
        };
        CumulativeResourceInfo {
            group: group.to_string(),
            name: self.resource_name(),
            path: scan.path,
            data,
        }
    }

    /// Scans the layered scope, logging and discarding I/O errors.
    fn scan(&self, base: &Path, override_root: Option<&Path>) -> Option<Scan> {
        match self.scan_layers(base, override_root) {
            Ok(scan) => scan,
            Err(e) => {
                tracing::warn!(
                    base = %base.display(),
                    path = %self.relative_path,
                    error = %e,
                    "failed to scan folder content"
                );
                None
            }
        }
    }

    fn scan_layers(&self, base: &Path, override_root: Option<&Path>) -> io::Result<Option<Scan>> {
        let base_dir = existing_dir(base.join(&self.relative_path));
        let override_dir =
            override_root.and_then(|root| existing_dir(root.join(&self.relative_path)));

        let Some(path) = base_dir.clone().or_else(|| override_dir.clone()) else {
            return Ok(None);
        };
        let tree = self.scan_level(base_dir.as_deref(), override_dir.as_deref(), 1)?;
        Ok(Some(Scan { path, tree }))
    }

    /// Scans one relative directory in both layers and recurses.
    fn scan_level(
        &self,
        base: Option<&Path>,
        override_dir: Option<&Path>,
        level: usize,
    ) -> io::Result<FolderTree> {
        let base_listing = base
            .map(|dir| list_level(dir, level))
            .transpose()?
            .unwrap_or_default();
        let override_listing = override_dir
            .map(|dir| list_level(dir, level))
            .transpose()?
            .unwrap_or_default();

        let mut tree = FolderTree::default();
        if self.keeps_files_at(level) {
            let overridden = self.matched_names(&override_listing);
            if let Some(base) = base {
                tree.files.extend(
                    self.matched_names(&base_listing)
                        .into_iter()
                        .filter(|name| !overridden.contains(name))
                        .map(|name| base.join(name)),
                );
            }
            if let Some(dir) = override_dir {
                tree.files
                    .extend(overridden.into_iter().map(|name| dir.join(name)));
            }
            sort_lexically(&mut tree.files);
        }

        if self.keeps_files_at(level + 1) {
            for name in union_dirs(&base_listing, &override_listing) {
                let child_base = base
                    .filter(|_| base_listing.dirs.contains(name))
                    .map(|b| b.join(name));
                let child_override = override_dir
                    .filter(|_| override_listing.dirs.contains(name))
                    .map(|o| o.join(name));
                let child =
                    self.scan_level(child_base.as_deref(), child_override.as_deref(), level + 1)?;
                if !child.is_empty() {
                    tree.dirs.push((name.to_string_lossy().into_owned(), child));
                }
            }
        }
        Ok(tree)
    }

    /// Lists the tracked directories one level deep looking for changes the
    /// per-file checks cannot see.
    fn find_scope_change(
        &self,
        base_dir: &Path,
        override_dir: Option<&Path>,
        tracked: &BTreeSet<PathBuf>,
        scope: &BTreeSet<PathBuf>,
    ) -> io::Result<Option<ScopeChange>> {
        for relative in scope {
            let level = relative.components().count() + 1;
            let base = existing_dir(base_dir.join(relative));
            let over = override_dir.and_then(|dir| existing_dir(dir.join(relative)));
            if base.is_none() && over.is_none() {
                return Ok(Some(ScopeChange::DirectoryRemoved(base_dir.join(relative))));
            }

            let base_listing = base.as_deref().map(list_dir).transpose()?.unwrap_or_default();
            let override_listing = over.as_deref().map(list_dir).transpose()?.unwrap_or_default();

            if self.keeps_files_at(level) {
                let overridden = self.matched_names(&override_listing);
                if let Some(ref dir) = over {
                    if let Some(path) = overridden
                        .iter()
                        .map(|name| dir.join(name))
                        .find(|path| !tracked.contains(path))
                    {
                        return Ok(Some(ScopeChange::Added(path)));
                    }
                }
                if let Some(ref dir) = base {
                    if let Some(path) = self
                        .matched_names(&base_listing)
                        .into_iter()
                        .filter(|name| !overridden.contains(name))
                        .map(|name| dir.join(name))
                        .find(|path| !tracked.contains(path))
                    {
                        return Ok(Some(ScopeChange::Added(path)));
                    }
                }
            }

            if self.keeps_files_at(level + 1) {
                for name in union_dirs(&base_listing, &override_listing) {
                    if scope.contains(&relative.join(name)) {
                        continue;
                    }
                    let child_base = base
                        .as_deref()
                        .filter(|_| base_listing.dirs.contains(name))
                        .map(|b| b.join(name));
                    let child_override = over
                        .as_deref()
                        .filter(|_| override_listing.dirs.contains(name))
                        .map(|o| o.join(name));
                    let child = self.scan_level(
                        child_base.as_deref(),
                        child_override.as_deref(),
                        level + 1,
                    )?;
                    if let Some(path) = child.first_file() {
                        return Ok(Some(ScopeChange::Added(path.to_path_buf())));
                    }
                }
            }
        }
        Ok(None)
    }

    fn keeps_files_at(&self, level: usize) -> bool {
        self.max_depth < 0 || i64::try_from(level).map_or(false, |l| l <= i64::from(self.max_depth))
    }

    fn matched_names<'a>(&self, listing: &'a DirListing) -> BTreeSet<&'a OsString> {
        listing
            .files
            .iter()
            .filter(|name| self.matcher.is_matched(Path::new(name)))
            .collect()
    }
}

fn existing_dir(path: PathBuf) -> Option<PathBuf> {
    path.is_dir().then_some(path)
}

fn list_dir(dir: &Path) -> io::Result<DirListing> {
    let mut listing = DirListing::default();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            listing.dirs.push(entry.file_name());
        } else if path.is_file() {
            listing.files.push(entry.file_name());
        }
    }
    listing.files.sort();
    listing.dirs.sort();
    Ok(listing)
}

/// Lists a directory reached by a scan. Below the scanned directory itself an
/// unreadable directory is skipped with a warning and the rest of the scope
/// is kept.
fn list_level(dir: &Path, level: usize) -> io::Result<DirListing> {
    match list_dir(dir) {
        Err(e) if level > 1 => {
            tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            Ok(DirListing::default())
        }
        listing => listing,
    }
}

/// Base directories first, then directories only the override layer has.
fn union_dirs<'a>(base: &'a DirListing, over: &'a DirListing) -> Vec<&'a OsString> {
    base.dirs
        .iter()
        .chain(over.dirs.iter().filter(|name| !base.dirs.contains(name)))
        .collect()
}

/// Relative directories holding tracked files, with all their ancestors up
/// to and including the scanned directory itself (the empty path).
fn tracked_directories(
    tracked: &BTreeSet<PathBuf>,
    base_dir: &Path,
    override_dir: Option<&Path>,
) -> BTreeSet<PathBuf> {
    let mut scope = BTreeSet::from([PathBuf::new()]);
    for path in tracked {
        let relative = override_dir
            .and_then(|dir| path.strip_prefix(dir).ok())
            .or_else(|| path.strip_prefix(base_dir).ok());
        let Some(mut dir) = relative.and_then(Path::parent) else {
            continue;
        };
        while scope.insert(dir.to_path_buf()) {
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }
    scope
}
