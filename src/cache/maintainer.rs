//! Applies change batches to the path index.
//!
//! The maintainer is the only writer of the [`PathIndex`]. Creations of
//! directories expand recursively (register the watch first, then enumerate,
//! so nothing created in between is lost); deletions cascade to descendants
//! because a deleted directory produces no per-child events.

use std::path::Path;

use crate::roots::{OverlayRoots, normalize};
use crate::update::PathUpdate;
use crate::walker::subtree_walk;
use crate::watcher::WatchRegistrar;

use super::index::PathIndex;

/// Borrows the pieces of cache state a batch application mutates.
pub struct CacheMaintainer<'a> {
    roots: &'a OverlayRoots,
    index: &'a mut PathIndex,
    registrar: &'a mut WatchRegistrar,
}

impl<'a> CacheMaintainer<'a> {
    pub fn new(
        roots: &'a OverlayRoots,
        index: &'a mut PathIndex,
        registrar: &'a mut WatchRegistrar,
    ) -> Self {
        Self {
            roots,
            index,
            registrar,
        }
    }

    /// Eagerly build the index: walk every root's indexed subtree in root
    /// order, registering watches and inserting every regular file.
    pub fn populate(&mut self) {
        for dir in self.roots.indexed_dirs().collect::<Vec<_>>() {
            if !dir.is_dir() {
                crate::debug_event!("maintainer", "no indexed subtree", "{}", dir.display());
                continue;
            }
            self.registrar.register_recursively(&dir);
            self.index_files_under(&dir);
        }
        crate::log_event!(
            "maintainer",
            "populated",
            "{} resources, {} watched directories",
            self.index.len(),
            self.registrar.watched_count()
        );
    }

    /// Apply one change batch. Changes need no index-shape mutation; they
    /// are surfaced to consumers through the update log only.
    pub fn apply(&mut self, update: &PathUpdate) {
        for path in update.creations() {
            self.apply_creation(path);
        }
        for path in update.deletions() {
            self.apply_deletion(path);
        }
    }

    fn apply_creation(&mut self, path: &Path) {
        let path = normalize(path);
        if path.is_dir() {
            // The new directory's own watch must exist before its children's
            // events can be observed; enumeration then catches anything
            // created before the watch was in place.
            self.registrar.register_recursively(&path);
            self.index_files_under(&path);
        } else if path.is_file() {
            self.insert_file(&path);
        } else {
            // Already gone again; the matching deletion follows in a later
            // batch (or cancelled within this cycle's reduction).
            crate::debug_event!("maintainer", "created path vanished", "{}", path.display());
        }
    }

    fn apply_deletion(&mut self, path: &Path) {
        // The path no longer exists on disk; everything below works from the
        // path string alone.
        let path = normalize(path);
        self.registrar.forget_subtree(&path);

        let Some(name) = self.roots.resource_name(&path) else {
            return;
        };
        let removed = self.index.remove_subtree(&name, &path);
        if removed > 0 {
            crate::log_event!(
                "maintainer",
                "removed",
                "{} entr{} under {}",
                removed,
                if removed == 1 { "y" } else { "ies" },
                path.display()
            );
        }
    }

    /// Recursively enumerate regular files under `dir` and insert each.
    fn index_files_under(&mut self, dir: &Path) {
        for entry in subtree_walk(dir) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file()) {
                        self.insert_file(entry.path());
                    }
                }
                Err(e) => {
                    tracing::warn!("[maintainer] walk failed under {}: {e}", dir.display());
                }
            }
        }
    }

    fn insert_file(&mut self, path: &Path) {
        // Files outside the indexed subtree are ignored.
        let Some(name) = self.roots.resource_name(path) else {
            return;
        };
        if name.is_empty() {
            return;
        }
        if self.index.insert(self.roots, name.clone(), path) {
            crate::debug_event!("maintainer", "added", "{name} <- {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::NullBackend;
    use std::collections::HashSet;
    use std::fs;
    use std::path::PathBuf;

    fn deletion_of(path: &Path) -> PathUpdate {
        let mut deletions = HashSet::new();
        deletions.insert(path.to_path_buf());
        PathUpdate::new(HashSet::new(), HashSet::new(), deletions)
    }

    fn creation_of(path: &Path) -> PathUpdate {
        let mut creations = HashSet::new();
        creations.insert(path.to_path_buf());
        PathUpdate::new(creations, HashSet::new(), HashSet::new())
    }

    #[test]
    fn test_populate_indexes_only_the_subtree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("layouts/x")).unwrap();
        fs::write(root.join("layouts/x/y.txt"), "y").unwrap();
        fs::write(root.join("untracked.txt"), "n").unwrap();

        let roots = OverlayRoots::new(vec![root.clone()], "layouts");
        let mut index = PathIndex::new();
        let mut registrar = WatchRegistrar::new(Box::new(NullBackend));
        CacheMaintainer::new(&roots, &mut index, &mut registrar).populate();

        assert_eq!(index.len(), 1);
        assert_eq!(
            index.path_overlays("x/y.txt"),
            &[root.join("layouts/x/y.txt")]
        );
    }

    #[test]
    fn test_directory_creation_expands_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("layouts")).unwrap();

        let roots = OverlayRoots::new(vec![root.clone()], "layouts");
        let mut index = PathIndex::new();
        let mut registrar = WatchRegistrar::new(Box::new(NullBackend));
        CacheMaintainer::new(&roots, &mut index, &mut registrar).populate();
        assert!(index.is_empty());

        // A whole tree appears at once; only the top directory is reported.
        fs::create_dir_all(root.join("layouts/new/deep")).unwrap();
        fs::write(root.join("layouts/new/a.txt"), "a").unwrap();
        fs::write(root.join("layouts/new/deep/b.txt"), "b").unwrap();

        CacheMaintainer::new(&roots, &mut index, &mut registrar)
            .apply(&creation_of(&root.join("layouts/new")));

        assert_eq!(index.path_overlays("new/a.txt").len(), 1);
        assert_eq!(index.path_overlays("new/deep/b.txt").len(), 1);
    }

    #[test]
    fn test_directory_deletion_cascades_without_child_events() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("layouts/x")).unwrap();
        for i in 0..50 {
            fs::write(root.join(format!("layouts/x/f{i}.txt")), "f").unwrap();
        }

        let roots = OverlayRoots::new(vec![root.clone()], "layouts");
        let mut index = PathIndex::new();
        let mut registrar = WatchRegistrar::new(Box::new(NullBackend));
        CacheMaintainer::new(&roots, &mut index, &mut registrar).populate();
        assert_eq!(index.len(), 50);

        fs::remove_dir_all(root.join("layouts/x")).unwrap();
        CacheMaintainer::new(&roots, &mut index, &mut registrar)
            .apply(&deletion_of(&root.join("layouts/x")));

        assert!(index.is_empty());
        for i in 0..50 {
            assert!(index.path_overlays(&format!("x/f{i}.txt")).is_empty());
        }
    }

    #[test]
    fn test_deletion_of_never_indexed_path_is_not_an_error() {
        let roots = OverlayRoots::new(vec![PathBuf::from("/app/a")], "layouts");
        let mut index = PathIndex::new();
        let mut registrar = WatchRegistrar::new(Box::new(NullBackend));
        CacheMaintainer::new(&roots, &mut index, &mut registrar)
            .apply(&deletion_of(Path::new("/app/a/layouts/ghost.txt")));
        assert!(index.is_empty());
    }
}
