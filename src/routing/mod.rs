//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route declaration (pattern or list of patterns + options)
//!     → pattern.rs (tokenize, reject malformed patterns)
//!     → cache.rs (reuse compiled patterns)
//!     → PatternSet (immutable, shared via Arc)
//!
//! Pathname
//!     → matcher.rs (try alternatives in order)
//!     → Return: MatchResult or None
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once, immutable afterwards
//! - No regex in the matching path
//! - Deterministic: same input always produces an equal result
//! - First alternative that matches wins

pub mod cache;
pub mod matcher;
pub mod pattern;

pub use matcher::{match_path, MatchOptions, MatchResult, Params, PathSpec, PatternSet, RouteMatcher};
pub use pattern::{CompileOptions, CompiledPattern, PatternError};
