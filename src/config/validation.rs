//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the root prefix and log level
//! - Check every route pattern compiles and route names are unique
//! - Detect conflicting group positions
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use crate::config::schema::RouterConfig;
use crate::routing::{MatchOptions, PatternError};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("router.root must start with '/', got {0:?}")]
    RootNotAbsolute(String),

    #[error("router.root must be a literal prefix, got {0:?}")]
    RootHasParameters(String),

    #[error("unknown log level {0:?}")]
    UnknownLogLevel(String),

    #[error("route #{0} has an empty name")]
    EmptyRouteName(usize),

    #[error("duplicate route name {0:?}")]
    DuplicateRouteName(String),

    #[error("route {route:?}: {source}")]
    InvalidPattern { route: String, source: PatternError },

    #[error("route {0:?} sets group_index without a group")]
    IndexWithoutGroup(String),

    #[error("routes {first:?} and {second:?} share group {group:?} index {index}")]
    DuplicateGroupIndex {
        group: String,
        index: u32,
        first: String,
        second: String,
    },
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let root = &config.router.root;
    if !root.starts_with('/') {
        errors.push(ValidationError::RootNotAbsolute(root.clone()));
    }
    if root.contains(':') {
        errors.push(ValidationError::RootHasParameters(root.clone()));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    let mut names = HashSet::new();
    let mut positions: Vec<(&str, u32, &str)> = Vec::new();
    for (i, route) in config.routes.iter().enumerate() {
        if route.name.is_empty() {
            errors.push(ValidationError::EmptyRouteName(i));
        } else if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRouteName(route.name.clone()));
        }

        let options = MatchOptions::new(route.url.clone())
            .exact(route.exact)
            .strict(true)
            .sensitive(config.matching.sensitive);
        if let Err(source) = options.compile() {
            errors.push(ValidationError::InvalidPattern {
                route: route.name.clone(),
                source,
            });
        }

        match (&route.group, route.group_index) {
            (None, Some(_)) => errors.push(ValidationError::IndexWithoutGroup(route.name.clone())),
            (Some(group), Some(index)) => {
                if let Some((_, _, first)) = positions
                    .iter()
                    .find(|(g, i, _)| *g == group.as_str() && *i == index)
                {
                    errors.push(ValidationError::DuplicateGroupIndex {
                        group: group.clone(),
                        index,
                        first: first.to_string(),
                        second: route.name.clone(),
                    });
                } else {
                    positions.push((group.as_str(), index, route.name.as_str()));
                }
            }
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
