//! Resolution of configured roots and named configurations against the
//! project directory.

use crate::error::ConfigError;
use crate::types::{ConfigSpec, ProjectConfig};
use std::path::{Path, PathBuf};
use strata_resource::{ByFileNameMatcher, CumulativeConfigLoader, FolderContentLoader, ResourceRoot};

/// File extension of cache artifacts.
const ARTIFACT_EXT: &str = "cache";

/// A named configuration ready to be loaded and cached.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The configuration name.
    pub name: String,
    /// Where the configuration's cache artifact lives.
    pub artifact: PathBuf,
    /// The loader collecting the configuration from every root.
    pub loader: CumulativeConfigLoader,
    /// Every root, with paths made absolute.
    pub roots: Vec<ResourceRoot>,
}

/// Returns the cache directory, resolved against `project_dir`.
pub fn cache_dir(config: &ProjectConfig, project_dir: &Path) -> PathBuf {
    project_dir.join(&config.cache.dir)
}

/// Resolves every root's directories against `project_dir`, keeping
/// declaration order.
pub fn resolve_roots(config: &ProjectConfig, project_dir: &Path) -> Vec<ResourceRoot> {
    config
        .roots
        .iter()
        .map(|root| {
            let resolved = ResourceRoot::new(&root.group, project_dir.join(&root.base));
            match root.override_dir {
                Some(ref dir) => resolved.with_override(project_dir.join(dir)),
                None => resolved,
            }
        })
        .collect()
}

/// Resolves one named configuration.
pub fn resolve_config(
    config: &ProjectConfig,
    project_dir: &Path,
    name: &str,
) -> Result<ResolvedConfig, ConfigError> {
    let spec = config
        .configs
        .get(name)
        .ok_or_else(|| ConfigError::UnknownConfig {
            name: name.to_string(),
        })?;

    Ok(ResolvedConfig {
        name: name.to_string(),
        artifact: cache_dir(config, project_dir).join(format!("{name}.{ARTIFACT_EXT}")),
        loader: CumulativeConfigLoader::new(name, vec![folder_loader(name, spec)?]),
        roots: resolve_roots(config, project_dir),
    })
}

/// Resolves every named configuration, sorted by name.
pub fn resolve_configs(
    config: &ProjectConfig,
    project_dir: &Path,
) -> Result<Vec<ResolvedConfig>, ConfigError> {
    config
        .configs
        .keys()
        .map(|name| resolve_config(config, project_dir, name))
        .collect()
}

fn folder_loader(name: &str, spec: &ConfigSpec) -> Result<FolderContentLoader, ConfigError> {
    let matcher = ByFileNameMatcher::new(&spec.patterns)
        .map_err(|e| ConfigError::InvalidConfig {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
    Ok(FolderContentLoader::new(
        &spec.path,
        spec.max_depth,
        spec.flat,
        matcher,
    ))
}
