//! Change batches and the multi-consumer update log.
//!
//! A [`PathUpdate`] is the net result of one poll cycle: which concrete
//! paths were created, changed, and deleted. Batches are appended to an
//! [`UpdateLog`] and consumed through independent [`UpdateCursor`]s.

mod log;

pub use log::{UpdateCursor, UpdateLog};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// An immutable change batch: creations, changes, and deletions observed in
/// one poll cycle. A path appears in at most one of the three sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathUpdate {
    creations: HashSet<PathBuf>,
    changes: HashSet<PathBuf>,
    deletions: HashSet<PathBuf>,
}

impl PathUpdate {
    pub fn new(
        creations: HashSet<PathBuf>,
        changes: HashSet<PathBuf>,
        deletions: HashSet<PathBuf>,
    ) -> Self {
        debug_assert!(creations.is_disjoint(&changes));
        debug_assert!(creations.is_disjoint(&deletions));
        debug_assert!(changes.is_disjoint(&deletions));
        Self {
            creations,
            changes,
            deletions,
        }
    }

    pub fn creations(&self) -> impl Iterator<Item = &Path> {
        self.creations.iter().map(PathBuf::as_path)
    }

    pub fn changes(&self) -> impl Iterator<Item = &Path> {
        self.changes.iter().map(PathBuf::as_path)
    }

    pub fn deletions(&self) -> impl Iterator<Item = &Path> {
        self.deletions.iter().map(PathBuf::as_path)
    }

    pub fn contains_creation(&self, path: &Path) -> bool {
        self.creations.contains(path)
    }

    pub fn contains_change(&self, path: &Path) -> bool {
        self.changes.contains(path)
    }

    pub fn contains_deletion(&self, path: &Path) -> bool {
        self.deletions.contains(path)
    }

    /// True when no path survived reduction for this cycle.
    pub fn is_empty(&self) -> bool {
        self.creations.is_empty() && self.changes.is_empty() && self.deletions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.creations.len() + self.changes.len() + self.deletions.len()
    }
}
