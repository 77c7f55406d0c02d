//! Strata CLI: builds, inspects and clears layered configuration caches.
//!
//! Provides `strata init` for project scaffolding, `strata warm` and
//! `strata clear` for cache maintenance, `strata status` and `strata show`
//! for inspection, and `strata scan` for running the layered folder scanner
//! ad hoc.

#![warn(missing_docs)]

mod clear;
mod init;
mod logging;
mod pipeline;
mod scan;
mod show;
mod status;
mod warm;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use strata_resource::UNLIMITED_DEPTH;

/// Strata: layered configuration cache.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Layered configuration cache")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `strata.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Track dependencies and rebuild stale caches (overrides `cache.debug`).
    #[arg(long, global = true, overrides_with = "no_debug")]
    pub debug: bool,

    /// Trust existing caches without checking dependencies.
    #[arg(long, global = true, overrides_with = "debug")]
    pub no_debug: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a starter `strata.toml`.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,
    },
    /// Build and persist caches.
    Warm(WarmArgs),
    /// Report whether each cache is fresh.
    Status(StatusArgs),
    /// Delete caches and their metadata.
    Clear(ClearArgs),
    /// Print a cached configuration, building it if needed.
    Show(ShowArgs),
    /// Scan a folder across a base and an override directory.
    Scan(ScanArgs),
}

/// Arguments for the `strata warm` subcommand.
#[derive(Parser, Debug)]
pub struct WarmArgs {
    /// Config to warm (default: all).
    pub name: Option<String>,

    /// Only rebuild caches that are not fresh.
    #[arg(long)]
    pub if_stale: bool,
}

/// Arguments for the `strata status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `strata clear` subcommand.
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Config to clear (default: all).
    pub name: Option<String>,
}

/// Arguments for the `strata show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Config to print.
    pub name: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `strata scan` subcommand.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Folder to scan, relative to each directory.
    pub path: String,

    /// Base directory.
    #[arg(long)]
    pub base: String,

    /// Override directory whose files win over the base directory's.
    #[arg(long = "override")]
    pub override_dir: Option<String>,

    /// File name pattern (glob, or regex wrapped in `/`). Repeatable.
    #[arg(short, long)]
    pub pattern: Vec<String>,

    /// Deepest nesting level to collect, -1 for no limit.
    #[arg(long, default_value_t = UNLIMITED_DEPTH, allow_negative_numbers = true)]
    pub depth: i32,

    /// Print files grouped by directory.
    #[arg(long)]
    pub tree: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Optional path to a custom config file or project directory.
    pub config: Option<String>,
    /// Debug mode forced from the command line, if any.
    pub debug: Option<bool>,
}

impl Cli {
    fn debug_override(&self) -> Option<bool> {
        match (self.debug, self.no_debug) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config.clone(),
        debug: cli.debug_override(),
    };

    let result = match cli.command {
        Command::Init { name } => init::run(name, &global),
        Command::Warm(ref args) => warm::run(args, &global),
        Command::Status(ref args) => status::run(args, &global),
        Command::Clear(ref args) => clear::run(args, &global),
        Command::Show(ref args) => show::run(args, &global),
        Command::Scan(ref args) => scan::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_init_default() {
        let cli = Cli::parse_from(["strata", "init"]);
        match cli.command {
            Command::Init { name } => assert!(name.is_none()),
            _ => panic!("expected Init command"),
        }
    }

    #[test]
    fn parse_init_with_name() {
        let cli = Cli::parse_from(["strata", "init", "acme"]);
        match cli.command {
            Command::Init { name } => assert_eq!(name.as_deref(), Some("acme")),
            _ => panic!("expected Init command"),
        }
    }

    #[test]
    fn parse_warm_default() {
        let cli = Cli::parse_from(["strata", "warm"]);
        match cli.command {
            Command::Warm(ref args) => {
                assert!(args.name.is_none());
                assert!(!args.if_stale);
            }
            _ => panic!("expected Warm command"),
        }
    }

    #[test]
    fn parse_warm_if_stale() {
        let cli = Cli::parse_from(["strata", "warm", "workflows", "--if-stale"]);
        match cli.command {
            Command::Warm(ref args) => {
                assert_eq!(args.name.as_deref(), Some("workflows"));
                assert!(args.if_stale);
            }
            _ => panic!("expected Warm command"),
        }
    }

    #[test]
    fn parse_status_json() {
        let cli = Cli::parse_from(["strata", "status", "--format", "json"]);
        match cli.command {
            Command::Status(ref args) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("expected Status command"),
        }
    }

    #[test]
    fn parse_show() {
        let cli = Cli::parse_from(["strata", "show", "acl"]);
        match cli.command {
            Command::Show(ref args) => {
                assert_eq!(args.name, "acl");
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Show command"),
        }
    }

    #[test]
    fn parse_scan_defaults() {
        let cli = Cli::parse_from(["strata", "scan", "Resources/config", "--base", "vendor/a"]);
        match cli.command {
            Command::Scan(ref args) => {
                assert_eq!(args.path, "Resources/config");
                assert_eq!(args.base, "vendor/a");
                assert!(args.override_dir.is_none());
                assert!(args.pattern.is_empty());
                assert_eq!(args.depth, -1);
                assert!(!args.tree);
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn parse_scan_full() {
        let cli = Cli::parse_from([
            "strata",
            "scan",
            "cfg",
            "--base",
            "vendor/a",
            "--override",
            "app/a",
            "-p",
            "*.yml",
            "--pattern",
            "/\\.xml$/",
            "--depth",
            "2",
            "--tree",
        ]);
        match cli.command {
            Command::Scan(ref args) => {
                assert_eq!(args.override_dir.as_deref(), Some("app/a"));
                assert_eq!(args.pattern, vec!["*.yml", "/\\.xml$/"]);
                assert_eq!(args.depth, 2);
                assert!(args.tree);
            }
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn parse_scan_negative_depth() {
        let cli = Cli::parse_from(["strata", "scan", "cfg", "--base", "b", "--depth", "-1"]);
        match cli.command {
            Command::Scan(ref args) => assert_eq!(args.depth, -1),
            _ => panic!("expected Scan command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["strata", "--quiet", "--config", "/srv/strata.toml", "status"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("/srv/strata.toml"));
        assert_eq!(cli.debug_override(), None);
    }

    #[test]
    fn debug_flags_override_each_other() {
        let cli = Cli::parse_from(["strata", "--debug", "status"]);
        assert_eq!(cli.debug_override(), Some(true));

        let cli = Cli::parse_from(["strata", "--no-debug", "status"]);
        assert_eq!(cli.debug_override(), Some(false));

        let cli = Cli::parse_from(["strata", "--no-debug", "warm", "--debug"]);
        assert_eq!(cli.debug_override(), Some(true));
    }
}
