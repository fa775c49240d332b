//! Line-level blame: walks a repository's commit ancestry and attributes
//! every line of a file (or an in-memory buffer derived from one) to the
//! revision that last touched it.
//!
//! The engine is generic over three narrow-contract collaborators —
//! [`store::ObjectStore`], [`store::RevisionWalk`] and [`store::DiffEngine`]
//! — so the matching algorithm in [`matcher`] never touches a concrete
//! repository type directly. [`gix_backend`] wires those traits to a real
//! `gix::Repository`; that's the only backend this crate ships.

mod buffer_blame;
mod diff_driver;
pub mod error;
mod gix_backend;
mod hunk;
mod line_index;
mod matcher;
mod path_set;
mod walk;

use std::path::PathBuf;

use gix::ObjectId;

pub use error::{Error, Result};
pub use gix_backend::GixBackend;
pub use matcher::Policy;
pub use store::{CommitInfo, Delta, DiffEngine, DiffHunk, ObjectStore, RevisionWalk};

pub mod store;

bitflags::bitflags! {
    /// spec.md §6: behavior-modifying flags for [`blame_file`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u32 {
        /// Detect renames across the path's history (spec.md §4.3/§4.6).
        const TRACK_FILE_RENAMES = 1 << 0;
    }
}

/// Inputs to [`blame_file`] (spec.md §6, mirroring libgit2's
/// `git_blame_options` normalization in spirit).
#[derive(Debug, Clone)]
pub struct Options {
    /// The revision to start the walk from; `None` resolves the store's
    /// current head (spec.md §6's `normalize_options`).
    pub newest_commit: Option<ObjectId>,
    /// Stop the walk at (and excluding the ancestors of) this revision.
    pub oldest_commit: Option<ObjectId>,
    pub flags: Flags,
    /// Which matching policy the matcher runs (spec.md §4.5, §9).
    pub policy: Policy,
}

impl Default for Options {
    /// spec.md §6: `TRACK_FILE_RENAMES` is on by default.
    fn default() -> Self {
        Self {
            newest_commit: None,
            oldest_commit: None,
            flags: Flags::TRACK_FILE_RENAMES,
            policy: Policy::default(),
        }
    }
}

/// One claimed, contiguous range of lines, attributed to the commit and
/// ancestor path that introduced it (spec.md §3/§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub(crate) final_start: u32,
    pub(crate) lines: u32,
    pub(crate) orig_start: u32,
    pub(crate) orig_path: PathBuf,
    pub(crate) final_commit_id: ObjectId,
    pub(crate) orig_commit_id: ObjectId,
}

impl Hunk {
    /// Number of lines this hunk covers.
    pub fn lines_in_hunk(&self) -> u32 {
        self.lines
    }

    /// The commit that introduced this hunk's content, in the coordinate
    /// space of the file being blamed.
    pub fn final_commit_id(&self) -> ObjectId {
        self.final_commit_id
    }

    /// 1-based starting line in the blamed (target) file.
    pub fn final_start_line_number(&self) -> u32 {
        self.final_start + 1
    }

    /// The commit this hunk is attributed to in ancestor-revision
    /// coordinates; equal to [`Self::final_commit_id`] except when a buffer
    /// blame (spec.md §4.7) extends a hunk forward from committed history.
    pub fn orig_commit_id(&self) -> ObjectId {
        self.orig_commit_id
    }

    /// 1-based starting line in [`Self::orig_path`] as it stood at
    /// [`Self::orig_commit_id`].
    pub fn orig_start_line_number(&self) -> u32 {
        self.orig_start + 1
    }

    /// The path this hunk's content lived at when it was introduced (may
    /// differ from the path the blame was requested for, when rename
    /// tracking is enabled).
    pub fn orig_path(&self) -> &std::path::Path {
        &self.orig_path
    }
}

/// The outcome of a blame run: every claimed hunk, covering the full file.
#[derive(Debug, Clone)]
pub struct BlameResult {
    hunks: Vec<Hunk>,
}

impl BlameResult {
    pub(crate) fn new(hunks: Vec<Hunk>) -> Self {
        Self { hunks }
    }

    pub fn len(&self) -> usize {
        self.hunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hunk> {
        self.hunks.iter()
    }

    /// Binary-search the hunk covering 1-based `line_number`.
    pub fn hunk_for_line(&self, line_number: u32) -> Option<&Hunk> {
        self.hunks
            .binary_search_by(|h| {
                if line_number < h.final_start_line_number() {
                    std::cmp::Ordering::Greater
                } else if line_number >= h.final_start_line_number() + h.lines {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()
            .map(|i| &self.hunks[i])
    }
}

impl<'a> IntoIterator for &'a BlameResult {
    type Item = &'a Hunk;
    type IntoIter = std::slice::Iter<'a, Hunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.hunks.iter()
    }
}

/// Blame `path` as it exists at `options.newest_commit` (or head), per
/// spec.md §4 end-to-end.
pub fn blame_file(
    store: &dyn ObjectStore,
    walk: &dyn RevisionWalk,
    diff: &dyn DiffEngine,
    path: &std::path::Path,
    options: &Options,
) -> Result<BlameResult> {
    self::walk::blame_file(store, walk, diff, path, options)
}

/// Extend a committed blame forward onto an in-memory buffer that descends
/// from `base`, per spec.md §4.7. `base_content` is the blamed file's
/// content as of `base`'s newest commit; lines not present in `buffer`'s
/// diff against it keep their original attribution.
pub fn blame_buffer(base: &BlameResult, base_content: &[u8], buffer: &[u8], diff: &dyn DiffEngine) -> BlameResult {
    self::buffer_blame::blame_buffer(base, base_content, buffer, diff)
}

/// The all-zero id [`blame_buffer`] uses to mark a hunk as locally modified
/// in the buffer rather than attributed to a real commit (spec.md §4.7).
pub fn buffer_blame_zero_id() -> ObjectId {
    self::buffer_blame::zero_id()
}
