//! The authoritative resource-name → concrete-path mapping.
//!
//! Invariant: the entry list of every resource name is ordered by root
//! precedence. Two roots R1 (earlier) and R2 (later) both providing resource
//! X keep R1's path before R2's, regardless of the order in which the two
//! facts were learned.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::roots::{OverlayRoots, normalize};

/// Mapping from resource name to the precedence-ordered concrete paths that
/// provide it. Paths are stored lexically normalized and duplicate-free.
#[derive(Debug, Default)]
pub struct PathIndex {
    entries: HashMap<String, Vec<PathBuf>>,
}

impl PathIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// All concrete paths providing `name`, highest precedence first.
    /// Empty for an unknown resource, never an error.
    pub fn path_overlays(&self, name: &str) -> &[PathBuf] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The highest-precedence path providing `name`, if any.
    pub fn resolve_file(&self, name: &str) -> Option<&Path> {
        self.entries
            .get(name)
            .and_then(|paths| paths.first())
            .map(PathBuf::as_path)
    }

    /// Insert a concrete path for `name`, preserving precedence order.
    ///
    /// Idempotent: an already-present path is a no-op. Otherwise the entry
    /// goes immediately before the first cached entry belonging to a
    /// later root, or at the end when no later root provides the resource.
    /// Returns whether the index changed.
    pub fn insert(&mut self, roots: &OverlayRoots, name: String, path: &Path) -> bool {
        let path = normalize(path);
        let paths = self.entries.entry(name).or_default();
        if paths.contains(&path) {
            return false;
        }

        let root = roots.owning_root(&path);
        let position = paths
            .iter()
            .position(|existing| roots.owning_root(existing) > root)
            .unwrap_or(paths.len());
        paths.insert(position, path);
        true
    }

    /// Remove the exact path cached for `name`, plus every cached path under
    /// any descendant resource name that is a filesystem descendant of
    /// `path`. Covers a directory whose deletion produced no per-child
    /// events. Returns the number of paths removed.
    ///
    /// This is a full index scan; deletions are rare relative to reads.
    pub fn remove_subtree(&mut self, name: &str, path: &Path) -> usize {
        let path = normalize(path);
        let prefix = if name.is_empty() {
            String::new()
        } else {
            format!("{name}/")
        };

        let mut removed = 0;
        self.entries.retain(|key, paths| {
            let before = paths.len();
            if key == name {
                paths.retain(|p| p != &path);
            } else if key.starts_with(&prefix) {
                paths.retain(|p| !p.starts_with(&path));
            }
            removed += before - paths.len();
            !paths.is_empty()
        });
        removed
    }

    /// Number of resource names currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots() -> OverlayRoots {
        OverlayRoots::new(
            vec![PathBuf::from("/app/a"), PathBuf::from("/app/b")],
            "layouts",
        )
    }

    #[test]
    fn test_unknown_resource_is_empty_not_missing() {
        let index = PathIndex::new();
        assert!(index.path_overlays("nope.txt").is_empty());
        assert!(index.resolve_file("nope.txt").is_none());
    }

    #[test]
    fn test_insert_preserves_precedence_regardless_of_arrival_order() {
        let roots = roots();
        let mut index = PathIndex::new();

        // Later root learned first.
        index.insert(
            &roots,
            "x/y.txt".to_string(),
            Path::new("/app/b/layouts/x/y.txt"),
        );
        index.insert(
            &roots,
            "x/y.txt".to_string(),
            Path::new("/app/a/layouts/x/y.txt"),
        );

        assert_eq!(
            index.path_overlays("x/y.txt"),
            &[
                PathBuf::from("/app/a/layouts/x/y.txt"),
                PathBuf::from("/app/b/layouts/x/y.txt"),
            ]
        );
        assert_eq!(
            index.resolve_file("x/y.txt"),
            Some(Path::new("/app/a/layouts/x/y.txt"))
        );
    }

    #[test]
    fn test_insert_is_idempotent() {
        let roots = roots();
        let mut index = PathIndex::new();
        let path = Path::new("/app/a/layouts/x/y.txt");

        assert!(index.insert(&roots, "x/y.txt".to_string(), path));
        assert!(!index.insert(&roots, "x/y.txt".to_string(), path));
        assert_eq!(index.path_overlays("x/y.txt").len(), 1);
    }

    #[test]
    fn test_remove_subtree_exact_path() {
        let roots = roots();
        let mut index = PathIndex::new();
        index.insert(
            &roots,
            "x/y.txt".to_string(),
            Path::new("/app/a/layouts/x/y.txt"),
        );
        index.insert(
            &roots,
            "x/y.txt".to_string(),
            Path::new("/app/b/layouts/x/y.txt"),
        );

        let removed = index.remove_subtree("x/y.txt", Path::new("/app/a/layouts/x/y.txt"));
        assert_eq!(removed, 1);
        assert_eq!(
            index.path_overlays("x/y.txt"),
            &[PathBuf::from("/app/b/layouts/x/y.txt")]
        );
    }

    #[test]
    fn test_remove_subtree_cascades_to_descendants() {
        let roots = roots();
        let mut index = PathIndex::new();
        index.insert(
            &roots,
            "x/y.txt".to_string(),
            Path::new("/app/a/layouts/x/y.txt"),
        );
        index.insert(
            &roots,
            "x/z/w.txt".to_string(),
            Path::new("/app/a/layouts/x/z/w.txt"),
        );
        // Same names from the other root must survive the cascade.
        index.insert(
            &roots,
            "x/y.txt".to_string(),
            Path::new("/app/b/layouts/x/y.txt"),
        );
        // A sibling name sharing the "x" prefix as a string but not as a
        // path component must survive too.
        index.insert(
            &roots,
            "xy/q.txt".to_string(),
            Path::new("/app/a/layouts/xy/q.txt"),
        );

        let removed = index.remove_subtree("x", Path::new("/app/a/layouts/x"));
        assert_eq!(removed, 2);
        assert_eq!(
            index.path_overlays("x/y.txt"),
            &[PathBuf::from("/app/b/layouts/x/y.txt")]
        );
        assert!(index.path_overlays("x/z/w.txt").is_empty());
        assert_eq!(index.path_overlays("xy/q.txt").len(), 1);
    }
}
