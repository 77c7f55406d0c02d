//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::collections::BTreeSet;
use std::path::Path;
use strata_resource::ByFileNameMatcher;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "strata.toml";

/// Loads and validates `<project_dir>/strata.toml`.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a `strata.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
        reason: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

fn missing(key: impl Into<String>) -> ConfigError {
    ConfigError::MissingField { key: key.into() }
}

fn invalid_config(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidConfig {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(missing("project.name"));
    }
    if config.cache.dir.is_empty() {
        return Err(missing("cache.dir"));
    }
    if config.roots.is_empty() {
        return Err(ConfigError::NoRoots);
    }

    let mut groups = BTreeSet::new();
    for (i, root) in config.roots.iter().enumerate() {
        if root.group.is_empty() {
            return Err(missing(format!("roots[{i}].group")));
        }
        if root.base.is_empty() {
            return Err(missing(format!("roots[{i}].base")));
        }
        if !groups.insert(root.group.as_str()) {
            return Err(ConfigError::InvalidRoot {
                group: root.group.clone(),
                reason: "declared more than once".to_string(),
            });
        }
    }

    for (name, spec) in &config.configs {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(invalid_config(name, "name cannot be used as a cache file name"));
        }
        if spec.path.is_empty() {
            return Err(missing(format!("configs.{name}.path")));
        }
        if spec.max_depth < -1 {
            return Err(invalid_config(
                name,
                format!("max_depth must be -1 or more, got {}", spec.max_depth),
            ));
        }
        ByFileNameMatcher::new(&spec.patterns).map_err(|e| invalid_config(name, e.to_string()))?;
    }
    Ok(())
}
