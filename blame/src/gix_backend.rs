//! The only concrete [`ObjectStore`]/[`RevisionWalk`]/[`DiffEngine`]
//! implementation this crate ships, backed by a real `gix::Repository`.

use std::ops::Range;
use std::path::{Path, PathBuf};

use gix::bstr::ByteSlice;
use gix::ObjectId;
use imara_diff::intern::InternedInput;
use imara_diff::sources::byte_lines;
use imara_diff::{Algorithm, Sink};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::store::{CommitInfo, Delta, DiffEngine, DiffHunk, ObjectStore, RevisionWalk};

/// Wraps a `gix::Repository`, implementing the engine's three collaborator
/// traits against it.
pub struct GixBackend {
    repo: gix::Repository,
}

impl GixBackend {
    pub fn new(repo: gix::Repository) -> Self {
        Self { repo }
    }
}

fn wrap<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
    Error::Store(Box::new(e))
}

impl ObjectStore for GixBackend {
    fn resolve_head(&self) -> Result<ObjectId> {
        Ok(self.repo.head_commit().map_err(wrap)?.id)
    }

    fn commit_info(&self, id: ObjectId) -> Result<CommitInfo> {
        let commit = self.repo.find_commit(id).map_err(wrap)?;
        let parents: SmallVec<[ObjectId; 2]> = commit.parent_ids().map(|id| id.detach()).collect();
        Ok(CommitInfo { id, parents })
    }

    fn commit_tree(&self, id: ObjectId) -> Result<ObjectId> {
        let commit = self.repo.find_commit(id).map_err(wrap)?;
        Ok(commit.tree_id().map_err(wrap)?.detach())
    }

    fn blob_at_path(&self, tree: ObjectId, path: &Path) -> Result<Option<ObjectId>> {
        let tree = self.repo.find_tree(tree).map_err(wrap)?;
        let components = path.components().map(|c| c.as_os_str().to_str().unwrap_or_default());
        let entry = tree.lookup_entry(components).map_err(wrap)?;
        Ok(entry.map(|e| e.object_id()))
    }

    fn blob_content(&self, blob: ObjectId) -> Result<Vec<u8>> {
        Ok(self.repo.find_blob(blob).map_err(wrap)?.data.clone())
    }
}

impl RevisionWalk for GixBackend {
    fn walk(&self, newest: ObjectId, oldest: Option<ObjectId>) -> Result<Box<dyn Iterator<Item = Result<ObjectId>> + '_>> {
        let platform = self.repo.rev_walk([newest]);
        let platform = match oldest {
            Some(id) => platform.with_hidden([id]),
            None => platform,
        };
        let walk = platform.all().map_err(wrap)?;
        Ok(Box::new(walk.map(|info| info.map(|i| i.id).map_err(wrap))))
    }
}

impl DiffEngine for GixBackend {
    fn tree_diff(&self, old_tree: Option<ObjectId>, new_tree: Option<ObjectId>, pathspec: Option<&[PathBuf]>) -> Result<Vec<Delta>> {
        let empty = self.repo.empty_tree();
        let old = match old_tree {
            Some(id) => self.repo.find_tree(id).map_err(wrap)?,
            None => empty.clone(),
        };
        let new = match new_tree {
            Some(id) => self.repo.find_tree(id).map_err(wrap)?,
            None => empty,
        };

        let mut deltas = Vec::new();
        let mut platform = old.changes().map_err(wrap)?;
        if pathspec.is_some() {
            platform.options(|o| {
                o.track_rewrites(None);
            });
        }
        platform
            .for_each_to_obtain_tree(&new, |change| {
                let delta = delta_from_change(&change);
                if let Some(paths) = pathspec {
                    if !paths.iter().any(|p| p.as_path() == delta.new_path) {
                        return Ok::<_, Error>(std::ops::ControlFlow::Continue(()));
                    }
                }
                deltas.push(delta);
                Ok(std::ops::ControlFlow::Continue(()))
            })
            .map_err(wrap)?;
        Ok(deltas)
    }

    fn blob_diff(&self, old: &[u8], new: &[u8]) -> Vec<DiffHunk> {
        line_diff(old, new)
    }
}

fn delta_from_change(change: &gix::object::tree::diff::Change<'_, '_, '_>) -> Delta {
    use gix::object::tree::diff::Change;
    match change {
        Change::Addition { location, id, .. } => Delta {
            old_path: None,
            new_path: bstr_to_path(location),
            old_blob: None,
            new_blob: Some(id.detach()),
        },
        Change::Deletion { location, id, .. } => Delta {
            old_path: Some(bstr_to_path(location)),
            new_path: bstr_to_path(location),
            old_blob: Some(id.detach()),
            new_blob: None,
        },
        Change::Modification { location, previous_id, id, .. } => Delta {
            old_path: Some(bstr_to_path(location)),
            new_path: bstr_to_path(location),
            old_blob: Some(previous_id.detach()),
            new_blob: Some(id.detach()),
        },
        Change::Rewrite {
            source_location,
            source_id,
            location,
            id,
            ..
        } => Delta {
            old_path: Some(bstr_to_path(source_location)),
            new_path: bstr_to_path(location),
            old_blob: Some(source_id.detach()),
            new_blob: Some(id.detach()),
        },
    }
}

fn bstr_to_path(b: &gix::bstr::BStr) -> PathBuf {
    PathBuf::from(b.to_str_lossy().into_owned())
}

/// A zero-context line diff via `imara-diff`'s histogram algorithm, shared
/// by [`GixBackend::blob_diff`] and buffer-blame (spec.md §4.7).
pub(crate) fn line_diff(old: &[u8], new: &[u8]) -> Vec<DiffHunk> {
    let input = InternedInput::new(byte_lines(old), byte_lines(new));
    let collector = HunkCollector {
        input: &input,
        hunks: Vec::new(),
    };
    imara_diff::diff(Algorithm::Histogram, &input, collector)
}

struct HunkCollector<'a> {
    input: &'a InternedInput<&'a [u8]>,
    hunks: Vec<DiffHunk>,
}

impl Sink for HunkCollector<'_> {
    type Out = Vec<DiffHunk>;

    fn process_change(&mut self, before: Range<u32>, after: Range<u32>) {
        let additions = self.input.after[after.start as usize..after.end as usize]
            .iter()
            .map(|token| self.input.interner[*token].to_vec())
            .collect();
        self.hunks.push(DiffHunk {
            old_start: before.start,
            old_lines: before.end - before.start,
            new_start: after.start,
            new_lines: after.end - after.start,
            additions,
        });
    }

    fn finish(self) -> Self::Out {
        self.hunks
    }
}
