//! Location values and the live-location seam.

use serde::{Deserialize, Serialize};

/// A point in the navigation history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    /// Path component, always starting with `/` once parsed.
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
    /// Scroll offsets remembered for this entry.
    pub scroll_position: Option<(f64, f64)>,
}

impl Location {
    /// A location with only a pathname.
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            ..Default::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_scroll_position(mut self, x: f64, y: f64) -> Self {
        self.scroll_position = Some((x, y));
        self
    }

    /// Parse `path?search#hash` into its parts.
    pub fn parse(path: &str) -> Self {
        let (rest, hash) = match path.find('#') {
            Some(i) => (&path[..i], &path[i..]),
            None => (path, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        let pathname = if pathname.starts_with('/') {
            pathname.to_string()
        } else {
            format!("/{}", pathname)
        };
        Self {
            pathname,
            search: if search == "?" { String::new() } else { search.to_string() },
            hash: if hash == "#" { String::new() } else { hash.to_string() },
            scroll_position: None,
        }
    }

    /// Render back to `path?search#hash`.
    pub fn to_path(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

/// Source of the live environment location.
///
/// Consulted every time the router state is read before its first write, so
/// implementations must report the current location, not a snapshot.
pub trait LocationSource: Send + Sync {
    fn current_location(&self) -> Location;
}

/// A location source that always reports the same location.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation(pub Location);

impl LocationSource for FixedLocation {
    fn current_location(&self) -> Location {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_components() {
        let location = Location::parse("/users/5?tab=info#bio");
        assert_eq!(location.pathname, "/users/5");
        assert_eq!(location.search, "?tab=info");
        assert_eq!(location.hash, "#bio");
        assert_eq!(location.to_path(), "/users/5?tab=info#bio");
    }

    #[test]
    fn test_parse_adds_leading_slash() {
        assert_eq!(Location::parse("about").pathname, "/about");
        assert_eq!(Location::parse("").pathname, "/");
    }

    #[test]
    fn test_empty_search_and_hash_are_dropped() {
        let location = Location::parse("/a?#");
        assert_eq!(location.search, "");
        assert_eq!(location.hash, "");
    }
}
