//! File system walker for overlay subtrees.
//!
//! Overlay roots are indexed in full: no gitignore rules, no hidden-file
//! filtering. Symlinks are followed (a symlink cycle is a deployment error,
//! not guarded here).

use ignore::{Walk, WalkBuilder};
use std::path::Path;

/// Walk a subtree depth-first, yielding the root itself first.
///
/// Errors surface as `Err` entries so callers can log and skip the affected
/// subtree instead of aborting the walk.
pub fn subtree_walk(root: &Path) -> Walk {
    WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_walk_includes_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".hidden"), "x").unwrap();
        fs::write(dir.path().join("plain.txt"), "y").unwrap();

        let files: Vec<_> = subtree_walk(dir.path())
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();

        assert!(files.contains(&".hidden".to_string()));
        assert!(files.contains(&"plain.txt".to_string()));
    }
}
