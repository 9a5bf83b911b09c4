//! Route matching logic.
//!
//! # Responsibilities
//! - Match a pathname against one pattern or an ordered list of alternatives
//! - Report the consumed url, exactness and captured parameters
//! - Provide the `RouteMatcher` seam used by subscriptions
//!
//! # Design Decisions
//! - Pure: identical inputs always produce equal results
//! - First alternative that matches wins
//! - Results are freshly allocated and compared by value, never by identity
//! - Invalid patterns fail at compile time, not at match time

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::sync::Arc;

use crate::routing::cache;
use crate::routing::pattern::{CompileOptions, CompiledPattern, PatternError};

/// Parameters captured by a match, in pattern-declaration order.
#[derive(Debug, Clone, Default)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Create an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Append a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// Content equality: two parameter lists are equal when they hold the same
// name/value pairs, whatever the order.
impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .all(|(k, v)| other.get(k) == Some(v.as_str()))
    }
}

impl Eq for Params {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// The outcome of matching a pathname against a pattern.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// The pattern that matched.
    pub path: String,
    /// The prefix of the pathname the pattern consumed.
    pub url: String,
    /// Whether the whole pathname was consumed.
    pub is_exact: bool,
    /// Captured parameters.
    pub params: Params,
}

/// One pattern or an ordered list of alternative patterns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum PathSpec {
    Single(String),
    Many(Vec<String>),
}

impl PathSpec {
    /// Patterns in the order they are tried.
    pub fn alternatives(&self) -> &[String] {
        match self {
            PathSpec::Single(path) => std::slice::from_ref(path),
            PathSpec::Many(paths) => paths,
        }
    }
}

impl Default for PathSpec {
    fn default() -> Self {
        PathSpec::Single("/".to_string())
    }
}

impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        PathSpec::Single(path.to_string())
    }
}

impl From<String> for PathSpec {
    fn from(path: String) -> Self {
        PathSpec::Single(path)
    }
}

impl From<Vec<String>> for PathSpec {
    fn from(paths: Vec<String>) -> Self {
        PathSpec::Many(paths)
    }
}

impl From<&[&str]> for PathSpec {
    fn from(paths: &[&str]) -> Self {
        PathSpec::Many(paths.iter().map(|p| p.to_string()).collect())
    }
}

/// Pattern plus matching options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub path: PathSpec,
    /// The pathname must be consumed in full.
    pub exact: bool,
    /// A trailing slash in the pattern is significant.
    pub strict: bool,
    /// Literal segments compare case-sensitively.
    pub sensitive: bool,
}

impl MatchOptions {
    pub fn new(path: impl Into<PathSpec>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            end: self.exact,
            strict: self.strict,
            sensitive: self.sensitive,
        }
    }

    /// Compile every alternative up front.
    pub fn compile(&self) -> Result<PatternSet, PatternError> {
        let options = self.compile_options();
        let patterns = self
            .path
            .alternatives()
            .iter()
            .map(|path| cache::compile(path, options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PatternSet { patterns })
    }
}

/// Trait for deciding whether a pathname activates a route.
pub trait RouteMatcher: Send + Sync {
    /// Returns the match for `pathname`, or `None` when the route is inactive.
    fn match_pathname(&self, pathname: &str) -> Option<MatchResult>;
}

impl<F> RouteMatcher for F
where
    F: Fn(&str) -> Option<MatchResult> + Send + Sync,
{
    fn match_pathname(&self, pathname: &str) -> Option<MatchResult> {
        self(pathname)
    }
}

/// Compiled alternatives, tried in order.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Arc<CompiledPattern>>,
}

impl PatternSet {
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl RouteMatcher for PatternSet {
    fn match_pathname(&self, pathname: &str) -> Option<MatchResult> {
        self.patterns
            .iter()
            .find_map(|pattern| match_compiled(pattern, pathname))
    }
}

fn match_compiled(pattern: &CompiledPattern, pathname: &str) -> Option<MatchResult> {
    let raw = pattern.find(pathname)?;
    let url = &pathname[..raw.consumed];
    let is_exact = url == pathname;
    if pattern.options().end && !is_exact {
        return None;
    }

    let params = pattern
        .param_names()
        .iter()
        .zip(raw.captures)
        .filter_map(|(name, range)| range.map(|r| (name.clone(), pathname[r].to_string())))
        .collect();

    let url = if pattern.source() == "/" && url.is_empty() {
        "/"
    } else {
        url
    };

    Some(MatchResult {
        path: pattern.source().to_string(),
        url: url.to_string(),
        is_exact,
        params,
    })
}

/// Match `pathname` against `options`.
///
/// Returns `Ok(None)` when nothing matches (including an empty list of
/// alternatives) and `Err` when a pattern is malformed.
pub fn match_path(pathname: &str, options: &MatchOptions) -> Result<Option<MatchResult>, PatternError> {
    let set = options.compile()?;
    let result = set.match_pathname(pathname);
    tracing::trace!(pathname, path = ?options.path, matched = result.is_some(), "Computed match");
    Ok(result)
}
