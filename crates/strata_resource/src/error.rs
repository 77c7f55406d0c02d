//! Error types for resource matching.

/// Errors raised while compiling file name patterns.
///
/// Scanning and freshness checks never fail; only building a matcher from
/// user-supplied patterns can.
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    /// A `/.../` pattern is not a valid regular expression.
    #[error("invalid regular expression '{pattern}': {reason}")]
    InvalidRegex {
        /// The pattern as written, including delimiters.
        pattern: String,
        /// Description of the compile failure.
        reason: String,
    },

    /// A glob pattern could not be parsed.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob {
        /// The pattern as written.
        pattern: String,
        /// Description of the parse failure.
        reason: String,
    },
}
