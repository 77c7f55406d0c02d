//! Scan results produced by a folder content loader.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Hierarchical scan result for one directory level.
///
/// `files` holds the files matched at this level, sorted. `dirs` maps each
/// sub-directory name to its own level, in discovery order. Sub-directories
/// without any matched file are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTree {
    /// Absolute paths of the files matched at this level.
    pub files: Vec<PathBuf>,

    /// Nested levels keyed by sub-directory name.
    pub dirs: Vec<(String, FolderTree)>,
}

impl FolderTree {
    /// Returns `true` if no file is matched at this level or below.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.iter().all(|(_, tree)| tree.is_empty())
    }

    /// Returns the nested level for a sub-directory name.
    pub fn get(&self, name: &str) -> Option<&FolderTree> {
        self.dirs
            .iter()
            .find(|(dir, _)| dir == name)
            .map(|(_, tree)| tree)
    }

    /// Returns the first matched file found depth-first, if any.
    pub fn first_file(&self) -> Option<&Path> {
        self.files
            .first()
            .map(PathBuf::as_path)
            .or_else(|| self.dirs.iter().find_map(|(_, tree)| tree.first_file()))
    }

    /// Consumes the tree and returns every matched file in lexical order of
    /// the full path strings.
    pub fn flatten(self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        sort_lexically(&mut out);
        out
    }

    fn collect_into(self, out: &mut Vec<PathBuf>) {
        out.extend(self.files);
        for (_, tree) in self.dirs {
            tree.collect_into(out);
        }
    }
}

/// Sorts paths byte-wise on their full string, so `sub.yml` comes before
/// `sub/a.yml`.
pub(crate) fn sort_lexically(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
}

/// The two shapes a folder scan can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "entries", rename_all = "snake_case")]
pub enum FolderContent {
    /// Every matched file in one sorted sequence.
    Flat(Vec<PathBuf>),
    /// Matched files grouped by sub-directory.
    Tree(FolderTree),
}

impl FolderContent {
    /// Returns `true` if the scan matched no file.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Flat(files) => files.is_empty(),
            Self::Tree(tree) => tree.is_empty(),
        }
    }

    /// Returns all matched files regardless of shape, sorted.
    pub fn files(&self) -> Vec<PathBuf> {
        match self {
            Self::Flat(files) => files.clone(),
            Self::Tree(tree) => tree.clone().flatten(),
        }
    }
}

/// The result of scanning one relative path for one owning group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeResourceInfo {
    /// Identity of the module that owns the scanned roots.
    pub group: String,

    /// Human-readable name, `"Folder content: <relative path>"`.
    pub name: String,

    /// The directory that was scanned: the base root's copy of the relative
    /// path, or the override root's when the base has none.
    pub path: PathBuf,

    /// The matched files.
    pub data: FolderContent,
}
