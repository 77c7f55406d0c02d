//! The `strata clear` command, which deletes configuration caches.

use crate::pipeline::Project;
use crate::{ClearArgs, GlobalArgs};

/// Runs the `strata clear` command.
///
/// Removes the artifact and sidecar of every selected cache. Missing caches
/// are not an error. Returns exit code 0 on success.
pub fn run(args: &ClearArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    for resolved in project.configs(args.name.as_deref())? {
        project.provider(&resolved).clear_cache()?;
        if !global.quiet {
            eprintln!("     Cleared {}", resolved.name);
        }
    }
    Ok(0)
}
