//! The three external collaborators spec.md §6 treats as narrow-contract,
//! out-of-scope dependencies: an object store, a revision walker, and a
//! text-diff engine. The core algorithm (C1–C7) is generic over these
//! traits; [`crate::gix_backend`] supplies the only concrete implementation
//! this crate ships.

use std::path::{Path, PathBuf};

use gix::ObjectId;
use smallvec::SmallVec;

use crate::error::Result;

/// A commit's identity and its direct parents, in the order the object
/// store reports them (spec.md §5: "parents are processed in the order
/// reported by the object store").
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub id: ObjectId,
    pub parents: SmallVec<[ObjectId; 2]>,
}

/// Read-only access to commits, trees and blobs.
pub trait ObjectStore {
    /// Resolve the repository's current head commit.
    fn resolve_head(&self) -> Result<ObjectId>;

    /// Look up a commit and enumerate its parents.
    fn commit_info(&self, id: ObjectId) -> Result<CommitInfo>;

    /// The tree object a commit points at.
    fn commit_tree(&self, id: ObjectId) -> Result<ObjectId>;

    /// Resolve `path` against `tree`, returning the blob id at that path if
    /// one exists (`None` if the path is absent from this tree).
    fn blob_at_path(&self, tree: ObjectId, path: &Path) -> Result<Option<ObjectId>>;

    /// The full content of a blob.
    fn blob_content(&self, blob: ObjectId) -> Result<Vec<u8>>;
}

/// A stream of commit ids, newest to oldest.
pub trait RevisionWalk {
    /// Yield `newest`'s ancestry (inclusive) in reverse chronological order,
    /// hiding the ancestors of `oldest` when given.
    fn walk(
        &self,
        newest: ObjectId,
        oldest: Option<ObjectId>,
    ) -> Result<Box<dyn Iterator<Item = Result<ObjectId>> + '_>>;
}

/// One entry of a tree-to-tree diff concerning a path the engine tracks.
#[derive(Debug, Clone)]
pub struct Delta {
    /// The path this entry had in the old tree, `None` if it didn't exist
    /// there (the file was added).
    pub old_path: Option<PathBuf>,
    /// The path this entry has in the new tree.
    pub new_path: PathBuf,
    pub old_blob: Option<ObjectId>,
    pub new_blob: Option<ObjectId>,
}

/// A single hunk of a zero-context line diff between two blobs.
///
/// Ranges are 0-based and exclusive at the end, matching the internal
/// convention of [`crate::hunk`]. `additions` carries the post-image content
/// of every added line in order, since spec.md §4.5.1 only ever needs
/// addition-line content as matching evidence.
#[derive(Debug, Clone, Default)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub additions: Vec<Vec<u8>>,
}

impl DiffHunk {
    /// spec.md §4.5.1: "`wedge = old_lines == 0 ? new_start : old_start`".
    pub fn wedge(&self) -> u32 {
        if self.old_lines == 0 {
            self.new_start
        } else {
            self.old_start
        }
    }
}

/// Tree diffing and blob diffing.
pub trait DiffEngine {
    /// Diff `old_tree` against `new_tree`.
    ///
    /// When `pathspec` is `Some`, the diff is restricted to those paths and
    /// rename detection is skipped (spec.md §4.6's cheap, filtered pass).
    /// When `None`, the full (unfiltered) diff is computed with rename
    /// detection enabled, for the re-request spec.md §4.4/§4.6 describe once
    /// a filtered diff comes back non-empty.
    fn tree_diff(
        &self,
        old_tree: Option<ObjectId>,
        new_tree: Option<ObjectId>,
        pathspec: Option<&[PathBuf]>,
    ) -> Result<Vec<Delta>>;

    /// A zero-context line diff between two blobs (or buffers).
    fn blob_diff(&self, old: &[u8], new: &[u8]) -> Vec<DiffHunk>;
}
