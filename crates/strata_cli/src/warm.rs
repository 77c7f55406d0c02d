//! The `strata warm` command, which builds and persists configuration caches.

use crate::pipeline::Project;
use crate::{GlobalArgs, WarmArgs};

/// Runs the `strata warm` command.
///
/// Rebuilds every selected cache, or with `--if-stale` only the ones that
/// are not fresh. Returns exit code 0 on success.
pub fn run(args: &WarmArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    for resolved in project.configs(args.name.as_deref())? {
        let mut provider = project.provider(&resolved);
        if args.if_stale {
            provider.ensure_cache_warmed_up()?;
        } else {
            provider.warm_up_cache()?;
        }
        if !global.quiet {
            eprintln!("      Warmed {} ({})", resolved.name, resolved.artifact.display());
        }
    }
    Ok(0)
}
