//! Cache freshness reporting for `strata status`.

use std::time::{SystemTime, UNIX_EPOCH};

use strata_cache::ConfigCache;

use crate::pipeline::Project;
use crate::{GlobalArgs, ReportFormat, StatusArgs};

/// Freshness of one named configuration's cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CacheStatus {
    pub name: String,
    pub path: String,
    pub fresh: bool,
    /// Seconds since the Unix epoch; `None` when the cache does not exist.
    pub built_at: Option<u64>,
}

/// Runs the `strata status` command.
///
/// Returns exit code 0 when every cache is fresh and 1 otherwise.
pub fn run(args: &StatusArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    let statuses = collect(&project)?;

    let report = match args.format {
        ReportFormat::Text => render_text(&statuses, project.debug),
        ReportFormat::Json => render_json(&statuses, project.debug)?,
    };
    println!("{report}");

    Ok(if statuses.iter().all(|s| s.fresh) { 0 } else { 1 })
}

pub(crate) fn collect(project: &Project) -> Result<Vec<CacheStatus>, Box<dyn std::error::Error>> {
    let statuses = project
        .configs(None)?
        .into_iter()
        .map(|resolved| {
            let cache = ConfigCache::new(&resolved.artifact, project.debug);
            CacheStatus {
                fresh: cache.is_fresh(),
                built_at: cache.timestamp().map(epoch_secs),
                path: resolved.artifact.display().to_string(),
                name: resolved.name,
            }
        })
        .collect();
    Ok(statuses)
}

fn epoch_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn render_text(statuses: &[CacheStatus], debug: bool) -> String {
    let mode = if debug { "debug" } else { "production" };
    let mut out = format!("mode: {mode}\n");
    for status in statuses {
        let state = match (status.built_at, status.fresh) {
            (None, _) => "missing",
            (Some(_), true) => "fresh",
            (Some(_), false) => "stale",
        };
        out.push_str(&format!("{:<8} {} ({})\n", state, status.name, status.path));
    }
    out.truncate(out.trim_end().len());
    out
}

fn render_json(statuses: &[CacheStatus], debug: bool) -> Result<String, serde_json::Error> {
    let caches: Vec<_> = statuses
        .iter()
        .map(|s| {
            serde_json::json!({
                "name": s.name,
                "path": s.path,
                "fresh": s.fresh,
                "built_at": s.built_at,
            })
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({
        "debug": debug,
        "caches": caches,
    }))
}
