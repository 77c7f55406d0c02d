//! The `strata scan` command, which runs the layered folder scanner without caching.

use std::path::{Path, PathBuf};

use strata_resource::{ByFileNameMatcher, CumulativeResourceInfo, FolderContentLoader};

use crate::{show, GlobalArgs, ReportFormat, ScanArgs};

/// Group name reported for ad hoc scans.
const SCAN_GROUP: &str = "scan";

/// Runs the `strata scan` command.
///
/// Returns exit code 0 when the folder exists under either directory and 1
/// when neither has it.
pub fn run(args: &ScanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(info) = scan(args)? else {
        if !global.quiet {
            eprintln!(
                "no '{}' folder under {}{}",
                args.path,
                args.base,
                args.override_dir
                    .as_deref()
                    .map(|dir| format!(" or {dir}"))
                    .unwrap_or_default()
            );
        }
        return Ok(1);
    };

    match args.format {
        ReportFormat::Text => print!("{}", show::render_infos(std::slice::from_ref(&info))),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
    }
    Ok(0)
}

fn scan(args: &ScanArgs) -> Result<Option<CumulativeResourceInfo>, Box<dyn std::error::Error>> {
    let matcher = ByFileNameMatcher::new(&args.pattern)?;
    let loader = FolderContentLoader::new(&args.path, args.depth, !args.tree, matcher);
    let override_dir = args.override_dir.as_ref().map(PathBuf::from);
    Ok(loader.load(SCAN_GROUP, Path::new(&args.base), override_dir.as_deref()))
}
