//! Shared pipeline helpers for CLI commands.
//!
//! Project root resolution, configuration loading, and construction of the
//! cache provider behind each named configuration.

use std::path::{Path, PathBuf};

use strata_cache::ConfigProvider;
use strata_config::{load_config, load_config_file, ProjectConfig, ResolvedConfig, CONFIG_FILE};
use strata_resource::CumulativeResourceInfo;

use crate::GlobalArgs;

/// The value cached for every named configuration.
pub type ConfigValue = Vec<CumulativeResourceInfo>;

/// Walks up from `start` looking for the nearest directory containing `strata.toml`.
///
/// Returns the directory containing `strata.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// A loaded project: its directory, configuration and effective cache mode.
pub struct Project {
    /// Directory every relative path is resolved against.
    pub root: PathBuf,
    /// The parsed configuration.
    pub config: ProjectConfig,
    /// Whether caches track their dependencies.
    pub debug: bool,
}

impl Project {
    /// Loads the project selected by the global CLI args.
    ///
    /// If `--config` is specified, uses that path (file → parent dir and that
    /// file, dir → `strata.toml` inside it). Otherwise walks up from the
    /// current directory looking for `strata.toml`.
    pub fn load(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let (root, config) = match global.config {
            Some(ref config_path) => {
                let p = PathBuf::from(config_path);
                if p.is_file() {
                    let root = p
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| PathBuf::from("."));
                    (root, load_config_file(&p)?)
                } else {
                    let config = load_config(&p)?;
                    (p, config)
                }
            }
            None => {
                let root = find_project_root(&std::env::current_dir()?)?;
                let config = load_config(&root)?;
                (root, config)
            }
        };
        let debug_mode = global.debug.unwrap_or(config.cache.debug);
        tracing::debug!(root = %root.display(), debug_mode, "project loaded");
        Ok(Self {
            root,
            config,
            debug: debug_mode,
        })
    }

    /// Resolves one named configuration, or all of them when `name` is `None`.
    pub fn configs(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<ResolvedConfig>, Box<dyn std::error::Error>> {
        let resolved = match name {
            Some(name) => vec![strata_config::resolve_config(&self.config, &self.root, name)?],
            None => strata_config::resolve_configs(&self.config, &self.root)?,
        };
        Ok(resolved)
    }

    /// Builds the cache provider for a resolved configuration.
    pub fn provider(&self, resolved: &ResolvedConfig) -> ConfigProvider<ConfigValue> {
        let loader = resolved.loader.clone();
        let roots = resolved.roots.clone();
        ConfigProvider::new(&resolved.artifact, self.debug, move |resources| {
            loader.load(&roots, resources)
        })
    }
}
