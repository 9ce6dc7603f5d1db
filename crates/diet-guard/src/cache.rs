//! Override cache
//!
//! Constructed once and shared. The first `get` loads the override table;
//! later calls return the memoized list until `invalidate` drops it. There
//! is no time-based expiry: admin writes invalidate explicitly.

use diet_guard_core::ExcludeOverride;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{GuardError, GuardResult};
use crate::loader::OverrideSource;

pub struct OverrideCache {
    source: Arc<dyn OverrideSource>,
    cached: RwLock<Option<Arc<Vec<ExcludeOverride>>>>,
    loads: AtomicU64,
}

impl OverrideCache {
    pub fn new(source: Arc<dyn OverrideSource>) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
            loads: AtomicU64::new(0),
        }
    }

    /// Validated overrides, loading them on a miss.
    pub async fn get(&self) -> GuardResult<Arc<Vec<ExcludeOverride>>> {
        if let Some(hit) = self.cached.read().await.as_ref() {
            return Ok(Arc::clone(hit));
        }

        let mut cached = self.cached.write().await;
        // Another task may have loaded while we waited for the write lock.
        if let Some(hit) = cached.as_ref() {
            return Ok(Arc::clone(hit));
        }

        let rows = self.source.load_overrides().await.map_err(|e| {
            warn!(error = %e, "Failed to load guardrail overrides");
            GuardError::OverridesUnavailable {
                reason: e.to_string(),
            }
        })?;
        let overrides = rows
            .iter()
            .map(ExcludeOverride::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                warn!(error = %e, "Invalid guardrail override row");
                GuardError::OverridesUnavailable {
                    reason: e.to_string(),
                }
            })?;

        let loaded = Arc::new(overrides);
        let n = self.loads.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(overrides = loaded.len(), loads = n, "Loaded guardrail overrides");
        *cached = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Drop the cached list; the next `get` reloads.
    pub async fn invalidate(&self) {
        let mut cached = self.cached.write().await;
        let had = cached.take().is_some();
        info!(was_cached = had, "Invalidated guardrail override cache");
    }

    pub async fn is_cached(&self) -> bool {
        self.cached.read().await.is_some()
    }

    /// Number of times the table has been loaded
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for OverrideCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideCache")
            .field("loads", &self.load_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::InMemoryOverrideStore;
    use crate::records::RawOverrideRow;

    fn row(id: &str, term: &str, exclude: &str) -> RawOverrideRow {
        RawOverrideRow {
            id: Some(id.into()),
            forbidden_term: Some(term.into()),
            exclude_if_contains: vec![exclude.into()],
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_memoizes_until_invalidated() {
        let store = Arc::new(InMemoryOverrideStore::with_rows(vec![row(
            "ovr-1",
            "aardappel",
            "zoete aardappel",
        )]));
        let cache = OverrideCache::new(store);

        assert!(!cache.is_cached().await);
        assert_eq!(cache.get().await.unwrap().len(), 1);
        assert_eq!(cache.get().await.unwrap().len(), 1);
        assert_eq!(cache.load_count(), 1);

        cache.invalidate().await;
        assert!(!cache.is_cached().await);
        cache.get().await.unwrap();
        assert_eq!(cache.load_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_row_is_an_error() {
        let mut bad = row("ovr-1", "aardappel", "zoete aardappel");
        bad.forbidden_term = None;
        let cache = OverrideCache::new(Arc::new(InMemoryOverrideStore::with_rows(vec![bad])));
        assert!(matches!(
            cache.get().await,
            Err(GuardError::OverridesUnavailable { .. })
        ));
        assert!(!cache.is_cached().await);
    }
}
