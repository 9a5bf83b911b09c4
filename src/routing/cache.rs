//! Compiled pattern cache.
//!
//! # Responsibilities
//! - Memoise compiled patterns per (pattern, options)
//! - Share compiled patterns across threads without copying
//!
//! # Design Decisions
//! - Process-wide `DashMap`, compiled patterns are immutable
//! - Bounded: once `CACHE_LIMIT` entries exist, new patterns compile uncached
//! - Compile errors are never cached

use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

use crate::routing::pattern::{CompileOptions, CompiledPattern, PatternError};

/// Maximum number of distinct compiled patterns kept in memory.
pub const CACHE_LIMIT: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    pattern: String,
    options: CompileOptions,
}

fn cache() -> &'static DashMap<CacheKey, Arc<CompiledPattern>> {
    static CACHE: OnceLock<DashMap<CacheKey, Arc<CompiledPattern>>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

/// Compile `pattern`, reusing a previously compiled copy when available.
pub fn compile(pattern: &str, options: CompileOptions) -> Result<Arc<CompiledPattern>, PatternError> {
    let key = CacheKey {
        pattern: pattern.to_string(),
        options,
    };
    if let Some(hit) = cache().get(&key) {
        return Ok(Arc::clone(hit.value()));
    }

    let compiled = Arc::new(CompiledPattern::compile(pattern, options)?);
    if cache().len() < CACHE_LIMIT {
        cache().insert(key, Arc::clone(&compiled));
    } else {
        tracing::trace!(pattern, "Pattern cache full, compiling without caching");
    }
    Ok(compiled)
}

/// Number of cached patterns.
pub fn cached_count() -> usize {
    cache().len()
}
