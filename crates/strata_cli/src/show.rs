//! The `strata show` command, which prints a cached configuration.

use std::fmt::Write;
use std::path::Path;

use strata_resource::{CumulativeResourceInfo, FolderContent, FolderTree};

use crate::pipeline::Project;
use crate::{GlobalArgs, ReportFormat, ShowArgs};

/// Runs the `strata show` command.
///
/// Reads the named configuration through its cache, rebuilding the cache
/// first when it is not fresh. Returns exit code 0 on success.
pub fn run(args: &ShowArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = Project::load(global)?;
    let resolved = project.configs(Some(args.name.as_str()))?.remove(0);
    let mut provider = project.provider(&resolved);
    let infos = provider.get_config()?;

    match args.format {
        ReportFormat::Text => print!("{}", render_infos(infos)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(infos)?),
    }
    Ok(0)
}

/// Renders scan results as indented text, one block per group.
pub(crate) fn render_infos(infos: &[CumulativeResourceInfo]) -> String {
    let mut out = String::new();
    for info in infos {
        let _ = writeln!(out, "{}: {}", info.group, info.name);
        let _ = writeln!(out, "  {}", info.path.display());
        match &info.data {
            FolderContent::Flat(files) => {
                for file in files {
                    let _ = writeln!(out, "    {}", file.display());
                }
            }
            FolderContent::Tree(tree) => render_tree(&mut out, tree, 2),
        }
    }
    out
}

fn render_tree(out: &mut String, tree: &FolderTree, depth: usize) {
    let indent = "  ".repeat(depth);
    for file in &tree.files {
        let name = file
            .file_name()
            .map(Path::new)
            .unwrap_or(file.as_path());
        let _ = writeln!(out, "{indent}{}", name.display());
    }
    for (dir, sub) in &tree.dirs {
        let _ = writeln!(out, "{indent}{dir}/");
        render_tree(out, sub, depth + 1);
    }
}
