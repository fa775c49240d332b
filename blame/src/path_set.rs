//! C3: the set of paths the blamed file has been known by.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// An ordered, idempotent set of paths, used both as a pathspec filter and
/// as a membership test for rename tracking (spec.md §4.3).
#[derive(Debug, Clone)]
pub(crate) struct PathSet(BTreeSet<PathBuf>);

impl PathSet {
    pub fn new(target: PathBuf) -> Self {
        let mut set = BTreeSet::new();
        set.insert(target);
        Self(set)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.0.contains(path)
    }

    /// Idempotent insert; returns whether `path` was newly added.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.0.insert(path)
    }

    pub fn as_vec(&self) -> Vec<PathBuf> {
        self.0.iter().cloned().collect()
    }
}
