//! Resources accumulated from several layered roots.
//!
//! A [`CumulativeResource`] remembers which roots were scanned, with which
//! loaders, and which files each loader found per group. It is the tracked
//! set that later freshness checks compare the file system against.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::container::ResourcesContainer;
use crate::info::CumulativeResourceInfo;
use crate::loader::FolderContentLoader;
use crate::resource::CacheState;

/// The directory roots owned by one group (bundle, module, package).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRoot {
    /// Identity of the owning group.
    pub group: String,

    /// The group's own directory.
    pub base: PathBuf,

    /// An application-level directory whose files replace the base
    /// directory's files at the same relative path.
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    pub override_dir: Option<PathBuf>,
}

impl ResourceRoot {
    /// Creates a root with only a base directory.
    pub fn new(group: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        Self {
            group: group.into(),
            base: base.into(),
            override_dir: None,
        }
    }

    /// Adds an override directory.
    pub fn with_override(mut self, dir: impl Into<PathBuf>) -> Self {
        self.override_dir = Some(dir.into());
        self
    }

    /// Returns the override directory, if any.
    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }
}

/// Files found by a set of loaders across a set of roots.
///
/// Found files are keyed by group, then by the loader's resource name, so
/// that each loader only ever compares against what it tracked itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeResource {
    resource: String,
    roots: Vec<ResourceRoot>,
    loaders: Vec<FolderContentLoader>,
    found: BTreeMap<String, BTreeMap<String, BTreeSet<PathBuf>>>,
}

impl CumulativeResource {
    /// Creates an empty resource named after the configuration it feeds.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            roots: Vec::new(),
            loaders: Vec::new(),
            found: BTreeMap::new(),
        }
    }

    /// Returns the resource name.
    pub fn name(&self) -> &str {
        &self.resource
    }

    /// Records a scanned root.
    pub fn add_root(&mut self, root: ResourceRoot) {
        if !self.roots.contains(&root) {
            self.roots.push(root);
        }
    }

    /// Returns the scanned roots.
    pub fn roots(&self) -> &[ResourceRoot] {
        &self.roots
    }

    /// Records a loader whose scope this resource tracks.
    pub fn add_loader(&mut self, loader: FolderContentLoader) {
        if !self.loaders.contains(&loader) {
            self.loaders.push(loader);
        }
    }

    /// Returns the recorded loaders.
    pub fn loaders(&self) -> &[FolderContentLoader] {
        &self.loaders
    }

    /// Records the files a loader found for a group.
    ///
    /// The entry is created even when `paths` is empty so that "scanned and
    /// found nothing" stays distinguishable from "never scanned".
    pub fn add_found<I>(&mut self, group: &str, name: &str, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.found
            .entry(group.to_string())
            .or_default()
            .entry(name.to_string())
            .or_default()
            .extend(paths);
    }

    /// Returns the files a loader found for a group.
    pub fn found(&self, group: &str, name: &str) -> Option<&BTreeSet<PathBuf>> {
        self.found.get(group)?.get(name)
    }

    /// Returns every file found for a group by any loader.
    pub fn found_in_group<'a>(&'a self, group: &str) -> impl Iterator<Item = &'a PathBuf> + 'a {
        self.found
            .get(group)
            .into_iter()
            .flat_map(|by_name| by_name.values().flatten())
    }

    /// Returns `true` if `path` was found for `group` by any loader.
    pub fn is_found(&self, group: &str, path: &Path) -> bool {
        self.found
            .get(group)
            .is_some_and(|by_name| by_name.values().any(|paths| paths.contains(path)))
    }
}

impl CacheState for CumulativeResource {
    fn is_cache_fresh(&self, timestamp: SystemTime) -> bool {
        self.roots.iter().all(|root| {
            self.loaders.iter().all(|loader| {
                let fresh = loader.is_resource_fresh(
                    &root.group,
                    &root.base,
                    root.override_dir(),
                    self,
                    timestamp,
                );
                if !fresh {
                    tracing::debug!(
                        resource = %self.resource,
                        group = %root.group,
                        loader = %loader.resource_name(),
                        "cumulative resource is stale"
                    );
                }
                fresh
            })
        })
    }
}

/// Runs a list of folder content loaders over every root of a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeConfigLoader {
    name: String,
    loaders: Vec<FolderContentLoader>,
}

impl CumulativeConfigLoader {
    /// Creates a loader for the configuration `name`.
    pub fn new(name: impl Into<String>, loaders: Vec<FolderContentLoader>) -> Self {
        Self {
            name: name.into(),
            loaders,
        }
    }

    /// Returns the configuration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the folder content loaders.
    pub fn loaders(&self) -> &[FolderContentLoader] {
        &self.loaders
    }

    /// Scans every root with every loader, in order.
    ///
    /// Registers one [`CumulativeResource`] covering everything scanned into
    /// `container` and returns the non-empty scan results.
    pub fn load(
        &self,
        roots: &[ResourceRoot],
        container: &mut ResourcesContainer,
    ) -> Vec<CumulativeResourceInfo> {
        let mut resource = CumulativeResource::new(&self.name);
        for loader in &self.loaders {
            resource.add_loader(loader.clone());
        }

        let mut result = Vec::new();
        for root in roots {
            resource.add_root(root.clone());
            for loader in &self.loaders {
                let info = loader.load_and_register(
                    &root.group,
                    &root.base,
                    root.override_dir(),
                    &mut resource,
                );
                result.extend(info);
            }
        }

        tracing::debug!(
            config = %self.name,
            roots = roots.len(),
            results = result.len(),
            "cumulative configuration loaded"
        );
        container.add_resource(resource);
        result
    }
}
