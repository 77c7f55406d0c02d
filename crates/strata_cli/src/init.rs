//! Project scaffolding for `strata init`.
//!
//! Writes a starter `strata.toml` declaring the project itself as the only
//! root, with an `app/` override directory and one `config` configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use strata_config::{load_config, CONFIG_FILE, DEFAULT_CACHE_DIR};

use crate::GlobalArgs;

/// Runs the `strata init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory.
/// Returns exit code 0 on success.
pub fn run(name: Option<String>, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{n}' already exists").into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => std::env::current_dir()?,
    };

    let config_path = project_dir.join(CONFIG_FILE);
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()).into());
    }

    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("my_project");

    write_strata_toml(&project_dir, project_name)?;
    fs::create_dir_all(project_dir.join("config"))?;
    fs::create_dir_all(project_dir.join("app").join("config"))?;

    // The starter file must load as written.
    load_config(&project_dir)?;

    if !global.quiet {
        eprintln!("  Creating new Strata project `{project_name}`");
        eprintln!("     Created {}", config_path.display());
    }
    Ok(0)
}

/// Writes the starter `strata.toml` configuration file.
fn write_strata_toml(root: &Path, name: &str) -> io::Result<()> {
    let content = format!(
        r#"[project]
name = "{name}"

[cache]
dir = "{DEFAULT_CACHE_DIR}"
debug = true

# Each root contributes files; files under `override` replace the base
# directory's files at the same relative path.
[[roots]]
group = "{name}"
base = "."
override = "app"

[configs.config]
path = "config"
patterns = ["*.yml", "*.yaml"]
max_depth = -1
flat = true
"#
    );
    fs::write(root.join(CONFIG_FILE), content)
}
