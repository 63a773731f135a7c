//! The overlay cache service façade.
//!
//! [`FsOverlayCache`] builds the index once at startup, then keeps it current
//! lazily: before answering any query it drains one poll cycle, appends the
//! reduced batch to the update log, and applies every batch its own internal
//! cursor has not yet seen. No background thread; staleness is bounded by
//! call frequency, not wall-clock time.

use std::path::PathBuf;

use parking_lot::Mutex;

use crate::config::Settings;
use crate::roots::OverlayRoots;
use crate::update::{PathUpdate, UpdateCursor, UpdateLog};
use crate::watcher::{NotifyBackend, NullBackend, WatchBackend, WatchRegistrar, reduce};

use super::error::CacheError;
use super::index::PathIndex;
use super::maintainer::CacheMaintainer;

/// The overlay cache contract.
///
/// When [`is_caching`](OverlayCache::is_caching) returns false the query
/// operations must not be called; [`DisabledCache`] rejects them with
/// [`CacheError::CachingDisabled`].
pub trait OverlayCache: Send + Sync {
    /// Whether query operations are available.
    fn is_caching(&self) -> bool;

    /// All concrete files providing `name` across the roots, highest
    /// precedence first. Empty for an unknown resource.
    fn path_overlays(&self, name: &str) -> Result<Vec<PathBuf>, CacheError>;

    /// The highest-precedence file providing `name`, if any.
    fn resolve_file(&self, name: &str) -> Result<Option<PathBuf>, CacheError>;

    /// A fresh, independent consumer of change batches. Call
    /// [`fetch_updates`](OverlayCache::fetch_updates) before iterating to
    /// force a drain, the same way the façade maintains itself.
    fn get_updates(&self) -> UpdateCursor;

    /// Force one drain-and-apply cycle without issuing a query.
    fn fetch_updates(&self);
}

/// State every drain-and-apply sequence mutates; everything lives under the
/// one service lock.
struct CacheState {
    index: PathIndex,
    registrar: WatchRegistrar,
    own_cursor: UpdateCursor,
}

/// The live overlay cache.
pub struct FsOverlayCache {
    roots: OverlayRoots,
    log: UpdateLog,
    state: Mutex<CacheState>,
}

impl FsOverlayCache {
    /// Build the cache with the platform watcher.
    ///
    /// When the platform watcher cannot be created the cache still comes up
    /// with its statically built index; it just never sees updates.
    pub fn new(roots: OverlayRoots) -> Self {
        let backend: Box<dyn WatchBackend> = match NotifyBackend::new() {
            Ok(backend) => Box::new(backend),
            Err(e) => {
                tracing::warn!("[cache] platform watcher unavailable, updates disabled: {e}");
                Box::new(NullBackend)
            }
        };
        Self::with_backend(roots, backend)
    }

    /// Build the cache with an explicit watch backend (embedders, tests).
    pub fn with_backend(roots: OverlayRoots, backend: Box<dyn WatchBackend>) -> Self {
        let log = UpdateLog::new();
        let own_cursor = log.new_consumer();
        let mut index = PathIndex::new();
        let mut registrar = WatchRegistrar::new(backend);

        CacheMaintainer::new(&roots, &mut index, &mut registrar).populate();

        Self {
            roots,
            log,
            state: Mutex::new(CacheState {
                index,
                registrar,
                own_cursor,
            }),
        }
    }

    /// The configured overlay roots.
    pub fn roots(&self) -> &OverlayRoots {
        &self.roots
    }

    /// Drain one poll cycle, publish the batch, and apply everything the
    /// internal cursor has not yet seen. The only path by which the index
    /// changes after population.
    fn validate_cache(&self, state: &mut CacheState) {
        let events = state.registrar.drain_one_poll_cycle();
        if !events.is_empty() {
            let batch = reduce(&events);
            if !batch.is_empty() {
                crate::debug_event!("cache", "batch", "{} net paths", batch.len());
                self.log.append(batch);
            }
        }

        let pending: Vec<std::sync::Arc<PathUpdate>> = state.own_cursor.by_ref().collect();
        for batch in pending {
            CacheMaintainer::new(&self.roots, &mut state.index, &mut state.registrar)
                .apply(&batch);
        }
    }
}

impl OverlayCache for FsOverlayCache {
    fn is_caching(&self) -> bool {
        true
    }

    fn path_overlays(&self, name: &str) -> Result<Vec<PathBuf>, CacheError> {
        let mut state = self.state.lock();
        self.validate_cache(&mut state);
        Ok(state.index.path_overlays(name).to_vec())
    }

    fn resolve_file(&self, name: &str) -> Result<Option<PathBuf>, CacheError> {
        let mut state = self.state.lock();
        self.validate_cache(&mut state);
        Ok(state.index.resolve_file(name).map(PathBuf::from))
    }

    fn get_updates(&self) -> UpdateCursor {
        self.log.new_consumer()
    }

    fn fetch_updates(&self) {
        let mut state = self.state.lock();
        self.validate_cache(&mut state);
    }
}

impl std::fmt::Debug for FsOverlayCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsOverlayCache")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

/// Service installed when caching is configured off.
///
/// Queries fail fast instead of answering with a misleadingly empty result;
/// the update operations are harmless no-ops.
#[derive(Debug, Default)]
pub struct DisabledCache {
    log: UpdateLog,
}

impl DisabledCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverlayCache for DisabledCache {
    fn is_caching(&self) -> bool {
        false
    }

    fn path_overlays(&self, _name: &str) -> Result<Vec<PathBuf>, CacheError> {
        Err(CacheError::CachingDisabled)
    }

    fn resolve_file(&self, _name: &str) -> Result<Option<PathBuf>, CacheError> {
        Err(CacheError::CachingDisabled)
    }

    fn get_updates(&self) -> UpdateCursor {
        self.log.new_consumer()
    }

    fn fetch_updates(&self) {}
}

/// Build the configured service: the live cache, or the disabled one when
/// `caching = false`.
pub fn from_settings(settings: &Settings) -> Box<dyn OverlayCache> {
    if settings.caching {
        Box::new(FsOverlayCache::new(OverlayRoots::new(
            settings.roots.clone(),
            settings.indexed_subtree.clone(),
        )))
    } else {
        crate::log_event!("cache", "disabled by configuration");
        Box::new(DisabledCache::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_cache_rejects_queries() {
        let cache = DisabledCache::new();
        assert!(!cache.is_caching());
        assert_eq!(
            cache.path_overlays("x/y.txt"),
            Err(CacheError::CachingDisabled)
        );
        assert_eq!(cache.resolve_file("x/y.txt"), Err(CacheError::CachingDisabled));
    }

    #[test]
    fn test_disabled_cache_update_operations_are_noops() {
        let cache = DisabledCache::new();
        cache.fetch_updates();
        let mut updates = cache.get_updates();
        assert!(updates.next().is_none());
    }

    #[test]
    fn test_from_settings_respects_caching_flag() {
        let settings = Settings {
            caching: false,
            ..Settings::default()
        };
        let cache = from_settings(&settings);
        assert!(!cache.is_caching());
    }
}
