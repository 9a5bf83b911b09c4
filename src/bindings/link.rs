//! Link binding: active-state and navigation for a route link.

use crate::router::RouterEngine;
use crate::routing::{match_path, MatchOptions, MatchResult, PathSpec, PatternError};
use crate::state::{History, Location};

/// A navigable link that knows when it points at the current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLink {
    pub url: String,
    /// Pattern(s) deciding the active state; defaults to `url`.
    pub url_match: Option<PathSpec>,
    pub exact: bool,
    pub strict: bool,
    pub sensitive: bool,
    pub active_class: String,
    pub anchor_class: Option<String>,
}

impl RouteLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            url_match: None,
            exact: false,
            strict: true,
            sensitive: false,
            active_class: "link-active".to_string(),
            anchor_class: None,
        }
    }

    pub fn url_match(mut self, spec: impl Into<PathSpec>) -> Self {
        self.url_match = Some(spec.into());
        self
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

    pub fn active_class(mut self, class: impl Into<String>) -> Self {
        self.active_class = class.into();
        self
    }

    pub fn anchor_class(mut self, class: impl Into<String>) -> Self {
        self.anchor_class = Some(class.into());
        self
    }

    /// The URL pushed on navigation: `url` under `root`, without a doubled slash.
    pub fn href(&self, root: &str) -> String {
        match root.strip_suffix('/') {
            Some(base) if self.url.starts_with('/') => format!("{base}{}", self.url),
            _ => format!("{root}{}", self.url),
        }
    }

    fn options(&self) -> MatchOptions {
        let path = self
            .url_match
            .clone()
            .unwrap_or_else(|| PathSpec::from(self.url.as_str()));
        MatchOptions::new(path)
            .exact(self.exact)
            .strict(self.strict)
            .sensitive(self.sensitive)
    }

    pub fn compute_match(&self, location: &Location) -> Result<Option<MatchResult>, PatternError> {
        match_path(&location.pathname, &self.options())
    }

    pub fn is_active(&self, location: &Location) -> Result<bool, PatternError> {
        Ok(self.compute_match(location)?.is_some())
    }

    /// CSS classes for the anchor at `location`.
    pub fn classes(&self, location: &Location) -> Result<Vec<String>, PatternError> {
        let mut classes = Vec::new();
        if self.is_active(location)? {
            classes.push(self.active_class.clone());
        }
        classes.extend(self.anchor_class.iter().cloned());
        Ok(classes)
    }

    /// Push the link target onto `history` and return it.
    pub fn navigate(&self, history: &dyn History, root: &str) -> String {
        let href = self.href(root);
        tracing::debug!(href = %href, "Link navigation");
        history.push(&href);
        href
    }

    /// Handle a click. Modified clicks (new tab, new window) are left to the
    /// host and navigate nowhere.
    pub fn click(&self, engine: &RouterEngine, modified: bool) -> Option<String> {
        if modified {
            return None;
        }
        let history = engine.history()?;
        let root = engine.root().unwrap_or_else(|| "/".to_string());
        Some(self.navigate(history.as_ref(), &root))
    }
}
