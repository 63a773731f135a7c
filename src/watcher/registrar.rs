//! Recursive watch registration and poll draining.
//!
//! Maintains the invariant that every directory that is or becomes part of a
//! watched root's indexed subtree has an active registration. A directory
//! reported as newly created must be registered (recursively) before events
//! from inside it can be trusted to appear in later polls; the cache
//! maintainer does this and then enumerates the directory's existing
//! contents to cover anything created before the watch existed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::walker::subtree_walk;

use super::backend::{RawEvent, WatchBackend};

/// Tracks registered directories and drains poll cycles from the backend.
pub struct WatchRegistrar {
    backend: Box<dyn WatchBackend>,
    watched: HashSet<PathBuf>,
}

impl WatchRegistrar {
    pub fn new(backend: Box<dyn WatchBackend>) -> Self {
        Self {
            backend,
            watched: HashSet::new(),
        }
    }

    /// Register `dir` and every directory beneath it, following symlinks.
    ///
    /// A directory that cannot be registered is logged and left unwatched;
    /// the rest of the tree still gets registered. Walk errors are logged
    /// and that subtree's contribution is skipped.
    pub fn register_recursively(&mut self, dir: &Path) {
        for entry in subtree_walk(dir) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                        self.register(entry.path());
                    }
                }
                Err(e) => {
                    tracing::warn!("[registrar] walk failed under {}: {e}", dir.display());
                }
            }
        }
    }

    /// Register a single directory. Already-registered directories are a no-op.
    pub fn register(&mut self, dir: &Path) {
        if self.watched.contains(dir) {
            return;
        }
        match self.backend.register(dir) {
            Ok(()) => {
                crate::debug_event!("registrar", "watching", "{}", dir.display());
                self.watched.insert(dir.to_path_buf());
            }
            Err(e) => {
                // Degraded, not fatal: this directory stays unwatched.
                tracing::error!("[registrar] {e}");
            }
        }
    }

    /// Drain every immediately ready event from the backend.
    ///
    /// Non-blocking; returns the raw events of one poll cycle in arrival
    /// order. An empty result means nothing happened since the last drain.
    pub fn drain_one_poll_cycle(&mut self) -> Vec<RawEvent> {
        self.backend.try_events()
    }

    /// Drop bookkeeping for a deleted directory and everything beneath it.
    ///
    /// The OS registration dies with the directory; this keeps the watched
    /// set from pinning stale paths, and lets a re-created directory at the
    /// same path be registered again.
    pub fn forget_subtree(&mut self, dir: &Path) {
        self.watched.retain(|d| !d.starts_with(dir));
    }

    /// Number of directories currently registered.
    pub fn watched_count(&self) -> usize {
        self.watched.len()
    }
}

impl std::fmt::Debug for WatchRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchRegistrar")
            .field("watched", &self.watched.len())
            .finish()
    }
}
