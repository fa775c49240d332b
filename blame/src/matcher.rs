//! C5: the blame matcher — the core of the engine (spec.md §4.5).
//!
//! Two policies are implemented: [`Policy::Passing`] (the default, scoring
//! every candidate hunk against its parent and requiring agreement) and
//! [`Policy::Trivial`] (a simpler first-match fallback, kept for
//! compatibility per spec.md §4.5.2). Merge commits are processed against
//! their first parent only, per spec.md §1's explicit non-goal allowing
//! multi-parent blame to fall back to a single parent.

use gix::ObjectId;

use crate::hunk::HunkStore;
use crate::line_index::LineIndex;
use crate::store::{Delta, DiffHunk};

/// Which matching policy to run (spec.md §4.5/§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    #[default]
    Passing,
    Trivial,
}

/// The diffs of one commit against one parent: every relevant delta and its
/// line-level hunks, in file order.
pub(crate) type ParentDiffs = Vec<(Delta, Vec<DiffHunk>)>;

pub(crate) struct Matcher {
    policy: Policy,
}

impl Matcher {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// Process commit `commit`'s diff against `parent` (`None` for a root
    /// commit, or when merge-parent 2..n are skipped per the single-parent
    /// fallback).
    pub fn process_commit(
        &self,
        store: &mut HunkStore,
        line_index: &LineIndex,
        commit: ObjectId,
        parent: Option<(ObjectId, &ParentDiffs)>,
    ) {
        match self.policy {
            Policy::Passing => self.process_commit_passing(store, line_index, commit, parent),
            Policy::Trivial => self.process_commit_trivial(store, line_index, commit, parent),
        }
    }

    /// spec.md §4.5.1.
    fn process_commit_passing(
        &self,
        store: &mut HunkStore,
        line_index: &LineIndex,
        commit: ObjectId,
        parent: Option<(ObjectId, &ParentDiffs)>,
    ) {
        store.reset_for_commit(commit);

        if let Some((_, diffs)) = parent {
            for (delta, diff_hunks) in diffs {
                // The path these lines live at under this parent, even if
                // none of them changed textually (a pure rename) — spec.md
                // §4.3's path-set growth has to be mirrored on the hunk
                // itself so a later claim attributes to the right path.
                let ancestor_path = delta.old_path.clone().unwrap_or_else(|| delta.new_path.clone());
                for hunk in store.unclaimed_mut() {
                    hunk.orig_path = ancestor_path.clone();
                }
                for diff_hunk in diff_hunks {
                    apply_diff_hunk(store, line_index, diff_hunk, delta);
                }
            }
        }

        // Commit end: parentcount(C) is 0 for a root commit (or a commit
        // whose single tracked parent produced no diff at all) and 1
        // otherwise, per the single-parent fallback.
        let threshold = u32::from(parent.is_some());

        let mut i = 0;
        while i < store.unclaimed().len() {
            if store.unclaimed()[i].current_score >= threshold {
                let hunk = &store.unclaimed()[i];
                let path = hunk.scored_path.clone().unwrap_or_else(|| hunk.orig_path.clone());
                store.claim(i, commit, path);
            } else {
                i += 1;
            }
        }

        if let Some((parent_id, _)) = parent {
            for idx in 0..store.unclaimed().len() {
                store.record_expectation(idx, parent_id);
            }
        }
    }

    /// spec.md §4.5.2.
    fn process_commit_trivial(
        &self,
        store: &mut HunkStore,
        line_index: &LineIndex,
        commit: ObjectId,
        parent: Option<(ObjectId, &ParentDiffs)>,
    ) {
        store.reset_for_commit(commit);

        let Some((parent_id, diffs)) = parent else {
            store.claim_rest(commit);
            return;
        };

        for (delta, diff_hunks) in diffs {
            for diff_hunk in diff_hunks {
                let wedge = diff_hunk.wedge();
                let Some(mut idx) = store.find_by_orig(wedge) else {
                    continue;
                };
                let hunk_orig_start = store.unclaimed()[idx].orig_start;
                if wedge > hunk_orig_start {
                    idx = store.split_unclaimed(idx, wedge - hunk_orig_start);
                }

                let mut claimed_any = false;
                for addition in &diff_hunk.additions {
                    if let Some(found) = find_matching_line(store, line_index, addition) {
                        idx = found;
                        claimed_any = true;
                    }
                }

                if claimed_any {
                    let path = delta.old_path.clone().unwrap_or_else(|| delta.new_path.clone());
                    store.claim(idx, commit, path);
                }

                shift_after(store, diff_hunk);
            }
        }

        for i in 0..store.unclaimed().len() {
            store.record_expectation(i, parent_id);
        }
    }
}

/// spec.md §4.5.1, per-diff-hunk and per-diff-line steps.
fn apply_diff_hunk(store: &mut HunkStore, line_index: &LineIndex, diff_hunk: &DiffHunk, delta: &Delta) {
    let wedge = diff_hunk.wedge();

    let mut current_diff_line = wedge;
    let mut scored_idx = None;

    if let Some(mut idx) = store.find_by_orig(wedge) {
        let hunk_orig_start = store.unclaimed()[idx].orig_start;
        if wedge > hunk_orig_start {
            idx = store.split_unclaimed(idx, wedge - hunk_orig_start);
        }

        for addition in &diff_hunk.additions {
            if let Some(i) = store.find_by_orig(current_diff_line) {
                if store.unclaimed()[i].orig_start == current_diff_line {
                    let final_line = store.unclaimed()[i].final_start;
                    if line_index.raw_line(final_line) == addition.as_slice() {
                        let hunk = &mut store.unclaimed_mut()[i];
                        hunk.current_score += 1;
                        hunk.scored_path = Some(
                            delta
                                .old_path
                                .clone()
                                .unwrap_or_else(|| delta.new_path.clone()),
                        );
                        scored_idx = Some(i);
                    }
                }
            }
            current_diff_line += 1;
        }
        let _ = idx;
    } else {
        current_diff_line = wedge + diff_hunk.additions.len() as u32;
    }

    if let Some(idx) = scored_idx {
        let hunk_orig_start = store.unclaimed()[idx].orig_start;
        if current_diff_line > hunk_orig_start {
            store.split_unclaimed(idx, current_diff_line - hunk_orig_start);
        }
    }

    shift_after(store, diff_hunk);
}

fn shift_after(store: &mut HunkStore, diff_hunk: &DiffHunk) {
    let current_diff_line = diff_hunk.wedge() + diff_hunk.additions.len() as u32;
    let delta = diff_hunk.old_lines as i64 - diff_hunk.new_lines as i64;
    if delta != 0 {
        store.shift_orig_from(current_diff_line, delta);
    }
}

fn find_matching_line(store: &mut HunkStore, line_index: &LineIndex, addition: &[u8]) -> Option<usize> {
    for i in 0..store.unclaimed().len() {
        let final_line = store.unclaimed()[i].final_start;
        if !addition.is_empty() && line_index.raw_line(final_line) == addition {
            return Some(i);
        }
    }
    None
}

