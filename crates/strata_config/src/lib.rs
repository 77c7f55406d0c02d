//! Parsing and validation of `strata.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a
//! strongly-typed [`ProjectConfig`], then resolves its roots and named
//! configurations into the inputs of the layered folder scanner.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use resolve::{cache_dir, resolve_config, resolve_configs, resolve_roots, ResolvedConfig};
pub use types::*;
