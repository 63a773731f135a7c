//! Ordered overlay roots and resource-name computation.
//!
//! An [`OverlayRoots`] holds the fixed, ordered list of base directories
//! supplied at construction plus the name of the indexed subtree. Position in
//! the list defines precedence: a lower index wins when multiple roots provide
//! the same resource.
//!
//! Resource names are normalized, forward-slash-separated strings relative to
//! the indexed subtree of the owning root: `<root>/<subtree>/x/y.txt` maps to
//! `x/y.txt`. Files outside the indexed subtree have no resource name and are
//! not tracked.

use std::path::{Component, Path, PathBuf};

/// The fixed, ordered overlay root list plus the indexed subtree name.
///
/// Immutable after construction. All name computation works on path strings
/// alone and never touches the file system, so it stays valid for paths that
/// no longer exist on disk.
#[derive(Debug, Clone)]
pub struct OverlayRoots {
    roots: Vec<PathBuf>,
    indexed_subtree: String,
}

impl OverlayRoots {
    /// Create a root list. Roots are lexically normalized; their order is
    /// the precedence order.
    ///
    /// An empty `indexed_subtree` indexes each root in its entirety.
    pub fn new(roots: Vec<PathBuf>, indexed_subtree: impl Into<String>) -> Self {
        Self {
            roots: roots.iter().map(|r| normalize(r)).collect(),
            indexed_subtree: indexed_subtree.into(),
        }
    }

    /// The configured roots, highest precedence first.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Name of the indexed subtree under each root.
    pub fn indexed_subtree(&self) -> &str {
        &self.indexed_subtree
    }

    /// The indexed directory of the root at `index`.
    pub fn indexed_dir(&self, index: usize) -> PathBuf {
        if self.indexed_subtree.is_empty() {
            self.roots[index].clone()
        } else {
            self.roots[index].join(&self.indexed_subtree)
        }
    }

    /// All indexed directories, in precedence order.
    pub fn indexed_dirs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        (0..self.roots.len()).map(|i| self.indexed_dir(i))
    }

    /// Index of the root owning `path`, by longest-prefix match.
    ///
    /// Returns `None` when the path lies under no configured root.
    pub fn owning_root(&self, path: &Path) -> Option<usize> {
        let path = normalize(path);
        self.roots
            .iter()
            .enumerate()
            .filter(|(_, root)| path.starts_with(root))
            .max_by_key(|(_, root)| root.components().count())
            .map(|(i, _)| i)
    }

    /// Compute the resource name of a concrete path.
    ///
    /// Returns `None` when the path is not under any root's indexed subtree.
    /// The indexed directory itself maps to the empty name. Works from the
    /// path string alone (the path may already be gone from disk).
    pub fn resource_name(&self, path: &Path) -> Option<String> {
        let path = normalize(path);
        let root = self.owning_root(&path)?;
        let relative = path.strip_prefix(self.indexed_dir(root)).ok()?;

        let mut name = String::new();
        for component in relative.components() {
            if !name.is_empty() {
                name.push('/');
            }
            name.push_str(component.as_os_str().to_str()?);
        }
        Some(name)
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component where possible. No symlink resolution, no I/O.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
