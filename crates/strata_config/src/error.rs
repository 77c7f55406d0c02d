//! Errors raised while reading `strata.toml` and resolving its configs.

use std::path::PathBuf;

/// A `strata.toml` that cannot be read, parsed or used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The project file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The project file is not valid TOML or does not fit the schema.
    #[error("malformed strata.toml: {reason}")]
    Parse {
        /// Parser message, including the line when known.
        reason: String,
    },

    /// A command named a config the project does not declare.
    #[error("no config named '{name}' in strata.toml")]
    UnknownConfig {
        /// The requested config name.
        name: String,
    },

    /// A required key is absent or empty.
    #[error("`{key}` must be set")]
    MissingField {
        /// Dotted path of the key, e.g. `roots[0].base`.
        key: String,
    },

    /// The project declares no `[[roots]]`, so there is nothing to scan.
    #[error("strata.toml declares no [[roots]]")]
    NoRoots,

    /// A `[[roots]]` entry is unusable.
    #[error("root '{group}': {reason}")]
    InvalidRoot {
        /// Group of the offending root.
        group: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `[configs.<name>]` table is unusable.
    #[error("config '{name}': {reason}")]
    InvalidConfig {
        /// Name of the offending config.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}
