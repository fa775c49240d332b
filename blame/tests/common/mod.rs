//! A hermetic, in-memory stand-in for a real repository: no object
//! database, no on-disk trees. Commits carry a full file snapshot rather
//! than a delta, which keeps test fixtures readable; [`FakeRepo`] derives
//! the deltas and renames the real engine needs to see.

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use blame::{CommitInfo, Delta, DiffEngine, DiffHunk, ObjectStore, RevisionWalk};
use gix::ObjectId;
use imara_diff::intern::InternedInput;
use imara_diff::sources::byte_lines;
use imara_diff::{Algorithm, Sink};

/// Deterministic, human-readable commit ids for fixtures: `id(1)`, `id(2)`, ...
pub fn id(n: u8) -> ObjectId {
    ObjectId::from_bytes_or_panic(&[n; 20])
}

struct Commit {
    id: ObjectId,
    parent: Option<ObjectId>,
}

pub struct FakeRepo {
    commits: Vec<Commit>,
    trees: HashMap<ObjectId, HashMap<PathBuf, ObjectId>>,
    blobs: HashMap<ObjectId, Vec<u8>>,
}

pub struct FakeRepoBuilder {
    commits: Vec<Commit>,
    trees: HashMap<ObjectId, HashMap<PathBuf, ObjectId>>,
    blobs: HashMap<ObjectId, Vec<u8>>,
    next_blob: u16,
}

impl FakeRepoBuilder {
    pub fn new() -> Self {
        Self {
            commits: Vec::new(),
            trees: HashMap::new(),
            blobs: HashMap::new(),
            next_blob: 1,
        }
    }

    /// Append a commit whose tree is the given full file snapshot. Commits
    /// must be added oldest first; each one's parent is the one before it.
    pub fn commit(mut self, commit_id: ObjectId, files: &[(&str, &[u8])]) -> Self {
        let parent = self.commits.last().map(|c| c.id);
        let mut tree = HashMap::new();
        for (path, content) in files {
            let blob_id = self.blob_id();
            self.blobs.insert(blob_id, content.to_vec());
            tree.insert(PathBuf::from(path), blob_id);
        }
        self.trees.insert(commit_id, tree);
        self.commits.push(Commit { id: commit_id, parent });
        self
    }

    fn blob_id(&mut self) -> ObjectId {
        let bytes = self.next_blob.to_be_bytes();
        self.next_blob += 1;
        let mut buf = [0u8; 20];
        buf[18] = bytes[0];
        buf[19] = bytes[1];
        ObjectId::from_bytes_or_panic(&buf)
    }

    pub fn build(self) -> FakeRepo {
        FakeRepo {
            commits: self.commits,
            trees: self.trees,
            blobs: self.blobs,
        }
    }
}

impl FakeRepo {
    fn find(&self, id: ObjectId) -> &Commit {
        self.commits.iter().find(|c| c.id == id).expect("commit exists in fixture")
    }
}

impl ObjectStore for FakeRepo {
    fn resolve_head(&self) -> blame::Result<ObjectId> {
        Ok(self.commits.last().expect("fixture has commits").id)
    }

    fn commit_info(&self, id: ObjectId) -> blame::Result<CommitInfo> {
        let commit = self.find(id);
        Ok(CommitInfo {
            id,
            parents: commit.parent.into_iter().collect::<smallvec::SmallVec<[ObjectId; 2]>>(),
        })
    }

    fn commit_tree(&self, id: ObjectId) -> blame::Result<ObjectId> {
        Ok(id)
    }

    fn blob_at_path(&self, tree: ObjectId, path: &Path) -> blame::Result<Option<ObjectId>> {
        Ok(self.trees.get(&tree).and_then(|t| t.get(path)).copied())
    }

    fn blob_content(&self, blob: ObjectId) -> blame::Result<Vec<u8>> {
        Ok(self.blobs.get(&blob).cloned().unwrap_or_default())
    }
}

impl RevisionWalk for FakeRepo {
    fn walk(&self, newest: ObjectId, oldest: Option<ObjectId>) -> blame::Result<Box<dyn Iterator<Item = blame::Result<ObjectId>> + '_>> {
        let mut cur = Some(newest);
        let find_parent = move |id: ObjectId| self.find(id).parent;
        let iter = std::iter::from_fn(move || {
            let id = cur?;
            cur = if Some(id) == oldest { None } else { find_parent(id) };
            Some(Ok(id))
        });
        Ok(Box::new(iter))
    }
}

impl DiffEngine for FakeRepo {
    fn tree_diff(&self, old_tree: Option<ObjectId>, new_tree: Option<ObjectId>, pathspec: Option<&[PathBuf]>) -> blame::Result<Vec<Delta>> {
        let empty = HashMap::new();
        let old = old_tree.and_then(|t| self.trees.get(&t)).unwrap_or(&empty);
        let new = new_tree.and_then(|t| self.trees.get(&t)).unwrap_or(&empty);
        let wanted = |p: &Path| pathspec.is_none_or(|paths| paths.iter().any(|w| w == p));

        let mut additions: Vec<(PathBuf, ObjectId)> = Vec::new();
        let mut deletions: Vec<(PathBuf, ObjectId)> = Vec::new();
        let mut deltas = Vec::new();

        for (path, new_blob) in new {
            if !wanted(path) {
                continue;
            }
            match old.get(path) {
                Some(old_blob) if old_blob == new_blob => {}
                Some(old_blob) => deltas.push(Delta {
                    old_path: Some(path.clone()),
                    new_path: path.clone(),
                    old_blob: Some(*old_blob),
                    new_blob: Some(*new_blob),
                }),
                None => additions.push((path.clone(), *new_blob)),
            }
        }
        for (path, old_blob) in old {
            if new.contains_key(path) || !wanted(path) {
                continue;
            }
            deletions.push((path.clone(), *old_blob));
        }

        // Rename detection (spec.md §4.6): only meaningful on the
        // unfiltered pass, pairing an addition with a deletion of
        // byte-identical content.
        if pathspec.is_none() {
            let mut paired = vec![false; deletions.len()];
            for (new_path, new_blob) in &additions {
                let new_content = self.blobs.get(new_blob);
                let Some(pos) = deletions.iter().position(|(_, old_blob)| {
                    self.blobs.get(old_blob) == new_content
                }) else {
                    deltas.push(Delta {
                        old_path: None,
                        new_path: new_path.clone(),
                        old_blob: None,
                        new_blob: Some(*new_blob),
                    });
                    continue;
                };
                paired[pos] = true;
                deltas.push(Delta {
                    old_path: Some(deletions[pos].0.clone()),
                    new_path: new_path.clone(),
                    old_blob: Some(deletions[pos].1),
                    new_blob: Some(*new_blob),
                });
            }
            for (idx, (path, old_blob)) in deletions.into_iter().enumerate() {
                if !paired[idx] {
                    deltas.push(Delta {
                        old_path: Some(path.clone()),
                        new_path: path,
                        old_blob: Some(old_blob),
                        new_blob: None,
                    });
                }
            }
        } else {
            deltas.extend(additions.into_iter().map(|(path, blob)| Delta {
                old_path: None,
                new_path: path,
                old_blob: None,
                new_blob: Some(blob),
            }));
            deltas.extend(deletions.into_iter().map(|(path, blob)| Delta {
                old_path: Some(path.clone()),
                new_path: path,
                old_blob: Some(blob),
                new_blob: None,
            }));
        }

        Ok(deltas)
    }

    fn blob_diff(&self, old: &[u8], new: &[u8]) -> Vec<DiffHunk> {
        line_diff(old, new)
    }
}

/// Mirrors `gix_backend::line_diff`: a zero-context histogram diff via
/// `imara-diff`, independent of the crate under test so these fixtures
/// exercise the same wedge/additions shape real callers see.
pub fn line_diff(old: &[u8], new: &[u8]) -> Vec<DiffHunk> {
    let input = InternedInput::new(byte_lines(old), byte_lines(new));
    let collector = Collector { input: &input, hunks: Vec::new() };
    imara_diff::diff(Algorithm::Histogram, &input, collector)
}

struct Collector<'a> {
    input: &'a InternedInput<&'a [u8]>,
    hunks: Vec<DiffHunk>,
}

impl Sink for Collector<'_> {
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
