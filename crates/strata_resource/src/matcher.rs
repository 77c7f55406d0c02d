//! File matching strategies used by the folder scanner.
//!
//! Only the file's base name is ever inspected, so a matcher decides the
//! same way for a file regardless of which root or sub-directory it sits in.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MatcherError;

/// Decides whether a discovered file belongs to a scan result.
pub trait FileMatcher {
    /// Returns `true` if `file` is matched by the rule(s) of this matcher.
    fn is_matched(&self, file: &Path) -> bool;
}

/// A single compiled file name pattern.
#[derive(Clone)]
enum FileNamePattern {
    Regex(regex::Regex),
    Glob(glob::Pattern),
}

impl FileNamePattern {
    /// Compiles `pattern`: `/.../` is a regular expression, anything else a glob.
    fn parse(pattern: &str) -> Result<Self, MatcherError> {
        match regex_body(pattern) {
            Some(body) => regex::Regex::new(body)
                .map(Self::Regex)
                .map_err(|e| MatcherError::InvalidRegex {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                }),
            None => glob::Pattern::new(pattern)
                .map(Self::Glob)
                .map_err(|e| MatcherError::InvalidGlob {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(name),
            Self::Glob(glob) => glob.matches(name),
        }
    }
}

/// Strips the `/` delimiters of a regular expression pattern.
fn regex_body(pattern: &str) -> Option<&str> {
    pattern.strip_prefix('/')?.strip_suffix('/')
}

/// Matches files by name against an ordered list of patterns.
///
/// A pattern wrapped in slashes (`/\.ya?ml$/`) is a regular expression
/// searched anywhere in the name; any other pattern is a shell glob that
/// must match the whole name (`*.yml`). A file is matched if any pattern
/// matches. An empty pattern list matches every file.
///
/// Serializes as its pattern list, and two matchers are equal when their
/// pattern lists are equal.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ByFileNameMatcher {
    patterns: Vec<String>,
    compiled: Vec<FileNamePattern>,
}

impl ByFileNameMatcher {
    /// Compiles a matcher from the given patterns, in order.
    pub fn new<I, S>(patterns: I) -> Result<Self, MatcherError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let compiled = patterns
            .iter()
            .map(|p| FileNamePattern::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns, compiled })
    }

    /// Returns a matcher that accepts every file.
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Returns the source patterns this matcher was built from.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns `true` if a file with the given base name is matched.
    pub fn is_name_matched(&self, name: &str) -> bool {
        self.compiled.is_empty() || self.compiled.iter().any(|p| p.matches(name))
    }
}

impl FileMatcher for ByFileNameMatcher {
    fn is_matched(&self, file: &Path) -> bool {
        file.file_name()
            .is_some_and(|name| self.is_name_matched(&name.to_string_lossy()))
    }
}

impl PartialEq for ByFileNameMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
    }
}

impl Eq for ByFileNameMatcher {}

impl fmt::Debug for ByFileNameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByFileNameMatcher")
            .field(&self.patterns)
            .finish()
    }
}

impl TryFrom<Vec<String>> for ByFileNameMatcher {
    type Error = MatcherError;

    fn try_from(patterns: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(patterns)
    }
}

impl From<ByFileNameMatcher> for Vec<String> {
    fn from(matcher: ByFileNameMatcher) -> Self {
        matcher.patterns
    }
}
