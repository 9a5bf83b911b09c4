//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::PathSpec;

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Root binding settings.
    pub router: RouterSection,

    /// Matching behaviour shared by every route.
    pub matching: MatchingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route table, used when simulating navigations.
    pub routes: Vec<RouteConfig>,
}

/// Root binding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterSection {
    /// URL prefix the application is mounted under.
    pub root: String,

    /// Which history implementation the host provides.
    pub history_type: HistoryType,

    /// Suffix appended to document titles.
    pub title_suffix: String,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            history_type: HistoryType::Browser,
            title_suffix: String::new(),
        }
    }
}

/// History implementation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryType {
    #[default]
    Browser,
    Hash,
    Memory,
}

/// Matching configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Case-sensitive literal matching.
    pub sensitive: bool,

    /// Where a grouped route lands relative to same-index siblings.
    pub group_insertion: GroupInsertion,
}

/// Registry insertion rule for grouped routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupInsertion {
    /// Insert before the first same-group entry with a greater index.
    /// Equal indices keep registration order.
    #[default]
    BeforeFirstGreater,
    /// Insert before the first same-group entry with an equal or greater
    /// index. A later route with an equal index moves ahead.
    BeforeFirstEqualOrGreater,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Route declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging and simulation output.
    pub name: String,

    /// Pattern, or list of alternative patterns.
    pub url: PathSpec,

    /// Require the whole pathname to match.
    #[serde(default)]
    pub exact: bool,

    /// Mutually exclusive group.
    #[serde(default)]
    pub group: Option<String>,

    /// Position inside the group (lower wins).
    #[serde(default)]
    pub group_index: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.router.root, "/");
        assert_eq!(config.router.history_type, HistoryType::Browser);
        assert_eq!(config.matching.group_insertion, GroupInsertion::BeforeFirstGreater);
        assert_eq!(config.observability.log_level, "info");
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_full_config_parses() {
        let config: RouterConfig = toml::from_str(
            r#"
            [router]
            root = "/app"
            history_type = "hash"
            title_suffix = " | Docs"

            [matching]
            sensitive = true
            group_insertion = "before_first_equal_or_greater"

            [[routes]]
            name = "home"
            url = "/"
            exact = true

            [[routes]]
            name = "docs"
            url = ["/docs", "/guide"]
            group = "main"
            group_index = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.router.history_type, HistoryType::Hash);
        assert!(config.matching.sensitive);
        assert_eq!(
            config.matching.group_insertion,
            GroupInsertion::BeforeFirstEqualOrGreater
        );
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].url.alternatives().len(), 2);
        assert_eq!(config.routes[1].group_index, Some(1));
    }
}
