//! Configuration types deserialized from `strata.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default cache directory, relative to the project directory.
pub const DEFAULT_CACHE_DIR: &str = ".strata/cache";

/// The top-level project configuration parsed from `strata.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Where caches are stored and whether they track their dependencies.
    #[serde(default)]
    pub cache: CacheSettings,
    /// Groups whose directories are scanned, in priority order.
    #[serde(default)]
    pub roots: Vec<RootConfig>,
    /// Named cached configurations.
    #[serde(default)]
    pub configs: BTreeMap<String, ConfigSpec>,
}

/// Core project metadata required in every `strata.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// A brief description of the project.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Cache storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Directory holding the cache artifacts.
    #[serde(default = "default_cache_dir")]
    pub dir: String,
    /// Track dependencies and rebuild stale caches automatically.
    #[serde(default)]
    pub debug: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            debug: false,
        }
    }
}

fn default_cache_dir() -> String {
    DEFAULT_CACHE_DIR.to_string()
}

/// The directories contributed by one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Identity of the group (bundle, module, package).
    pub group: String,
    /// The group's own directory.
    pub base: String,
    /// Directory whose files replace the base directory's files at the same
    /// relative path.
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    pub override_dir: Option<String>,
}

/// One cached configuration: which folder to collect from every root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSpec {
    /// Folder scanned under every root.
    pub path: String,
    /// File name patterns: globs, or regular expressions wrapped in `/`.
    /// Empty matches every file.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Deepest nesting level collected, `-1` for no limit.
    #[serde(default = "default_max_depth")]
    pub max_depth: i32,
    /// Produce a flat file list instead of a directory tree.
    #[serde(default = "default_flat")]
    pub flat: bool,
}

fn default_max_depth() -> i32 {
    -1
}

fn default_flat() -> bool {
    true
}
