//! C1: the hunk store. Tracks the unclaimed set (line ranges still awaiting
//! attribution, carrying the matcher's scratch state) and the claimed set
//! (attributed ranges, exposed to callers as [`crate::Hunk`]).
//!
//! Internally all ranges are 0-based and exclusive at the end; the public
//! [`crate::Hunk`] accessors add 1 to present spec.md §3's 1-based
//! numbering.

use std::ops::Range;
use std::path::PathBuf;

use gix::ObjectId;
use rangemap::RangeMap;
use smallvec::SmallVec;

/// One contiguous range of lines still awaiting attribution (spec.md §3).
#[derive(Debug, Clone)]
pub(crate) struct UnclaimedHunk {
    pub final_start: u32,
    pub lines: u32,
    pub orig_start: u32,
    pub orig_path: PathBuf,
    pub current_score: u32,
    pub scored_path: Option<PathBuf>,
    /// Parent-commit-id -> expected `orig_start` under that parent, restored
    /// at the start of processing that parent's commit (spec.md §4.5.1).
    pub linemap: SmallVec<[(ObjectId, u32); 2]>,
}

impl UnclaimedHunk {
    pub fn final_range(&self) -> Range<u32> {
        self.final_start..self.final_start + self.lines
    }

    #[cfg(test)]
    pub fn orig_range(&self) -> Range<u32> {
        self.orig_start..self.orig_start + self.lines
    }

    fn reset_for_commit(&mut self, commit: ObjectId) {
        self.current_score = 0;
        self.scored_path = None;
        if let Some(&(_, expected)) = self.linemap.iter().find(|(id, _)| *id == commit) {
            self.orig_start = expected;
        }
    }

    fn record_expectation(&mut self, parent: ObjectId) {
        if let Some(entry) = self.linemap.iter_mut().find(|(id, _)| *id == parent) {
            entry.1 = self.orig_start;
        } else {
            self.linemap.push((parent, self.orig_start));
        }
    }
}

/// A claimed (attributed) hunk, as exposed through [`crate::Hunk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Claim {
    /// `orig_start` at the beginning of the claimed final-range this value
    /// is stored under; per-line `orig_start` is recovered as
    /// `orig_start_at_range_start + (final_line - range.start)`.
    pub orig_start_at_range_start: u32,
    pub orig_path: PathBuf,
    pub final_commit_id: ObjectId,
    pub orig_commit_id: ObjectId,
}

/// The hunk store: an ordered `Vec` for the rich, mutable unclaimed set, and
/// a `rangemap::RangeMap` for the append-only claimed set (the same
/// structure the teacher's `IncompleteBlame` uses for exactly this purpose).
#[derive(Debug)]
pub(crate) struct HunkStore {
    unclaimed: Vec<UnclaimedHunk>,
    claimed: RangeMap<u32, Claim>,
    total_lines: u32,
}

impl HunkStore {
    /// Spec.md §3: "Initialized to a single hunk covering lines 1..N".
    pub fn new(total_lines: u32, orig_path: PathBuf) -> Self {
        let unclaimed = if total_lines == 0 {
            Vec::new()
        } else {
            vec![UnclaimedHunk {
                final_start: 0,
                lines: total_lines,
                orig_start: 0,
                orig_path,
                current_score: 0,
                scored_path: None,
                linemap: SmallVec::new(),
            }]
        };
        Self {
            unclaimed,
            claimed: RangeMap::new(),
            total_lines,
        }
    }

    pub fn is_empty_unclaimed(&self) -> bool {
        self.unclaimed.is_empty()
    }

    pub fn unclaimed_mut(&mut self) -> &mut Vec<UnclaimedHunk> {
        &mut self.unclaimed
    }

    pub fn unclaimed(&self) -> &[UnclaimedHunk] {
        &self.unclaimed
    }

    /// Commit-start reset (spec.md §4.5.1): restore each hunk's expected
    /// ancestor position under `commit` and clear scoring scratch state.
    pub fn reset_for_commit(&mut self, commit: ObjectId) {
        for hunk in &mut self.unclaimed {
            hunk.reset_for_commit(commit);
        }
    }

    /// Index of the unclaimed hunk whose orig range contains `line`, if any.
    ///
    /// Unclaimed hunks are always kept in the same relative order in both
    /// coordinate systems (splitting and shifting never reorders them), so
    /// the same binary search works against `orig_range`.
    pub fn find_by_orig(&self, line: u32) -> Option<usize> {
        self.unclaimed
            .binary_search_by(|h| {
                if line < h.orig_start {
                    std::cmp::Ordering::Greater
                } else if line >= h.orig_start + h.lines {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()
    }

    /// Split unclaimed hunk `idx` at relative offset `r` (spec.md §4.1).
    /// Returns the index of the right half, or `idx` unchanged if `r` is 0
    /// or `>= lines` (a no-op split).
    pub fn split_unclaimed(&mut self, idx: usize, r: u32) -> usize {
        let hunk = &self.unclaimed[idx];
        if r == 0 || r >= hunk.lines {
            return idx;
        }

        let right = UnclaimedHunk {
            final_start: hunk.final_start + r,
            lines: hunk.lines - r,
            orig_start: hunk.orig_start + r,
            orig_path: hunk.orig_path.clone(),
            current_score: 0,
            scored_path: None,
            linemap: SmallVec::new(),
        };
        self.unclaimed[idx].lines = r;
        self.unclaimed.insert(idx + 1, right);
        idx + 1
    }

    /// Shift-by-orig (spec.md §4.1): same, for `orig_start`.
    pub fn shift_orig_from(&mut self, from: u32, delta: i64) {
        for hunk in &mut self.unclaimed {
            if hunk.orig_start >= from {
                hunk.orig_start = (hunk.orig_start as i64 + delta) as u32;
            }
        }
    }

    pub fn record_expectation(&mut self, idx: usize, parent: ObjectId) {
        self.unclaimed[idx].record_expectation(parent);
    }

    /// Claim unclaimed hunk `idx` to `commit`, moving it to the claimed set.
    pub fn claim(&mut self, idx: usize, commit: ObjectId, orig_path: PathBuf) {
        let hunk = self.unclaimed.remove(idx);
        debug_assert!(hunk.lines >= 1, "zero-length hunks must never be created");
        self.claimed.insert(
            hunk.final_range(),
            Claim {
                orig_start_at_range_start: hunk.orig_start,
                orig_path,
                final_commit_id: commit,
                orig_commit_id: commit,
            },
        );
    }

    /// End-of-walk / root-commit terminator (spec.md §4.4/§4.5.1): claim
    /// every remaining unclaimed hunk to `commit`, keeping each hunk's own
    /// tracked path.
    pub fn claim_rest(&mut self, commit: ObjectId) {
        while let Some(hunk) = self.unclaimed.pop() {
            self.claimed.insert(
                hunk.final_range(),
                Claim {
                    orig_start_at_range_start: hunk.orig_start,
                    orig_path: hunk.orig_path,
                    final_commit_id: commit,
                    orig_commit_id: commit,
                },
            );
        }
    }

    pub fn is_complete(&self) -> bool {
        self.claimed.gaps(&(0..self.total_lines)).next().is_none()
    }

    #[cfg(test)]
    pub fn claimed_count(&self) -> usize {
        self.claimed.iter().count()
    }

    #[cfg(test)]
    pub fn claimed_by_index(&self, index: usize) -> Option<crate::Hunk> {
        self.claimed.iter().nth(index).map(Self::to_public)
    }

    pub fn claimed_iter(&self) -> impl Iterator<Item = crate::Hunk> + '_ {
        self.claimed.iter().map(Self::to_public)
    }

    fn to_public((range, claim): (&Range<u32>, &Claim)) -> crate::Hunk {
        crate::Hunk {
            final_start: range.start,
            lines: range.end - range.start,
            orig_start: claim.orig_start_at_range_start,
            orig_path: claim.orig_path.clone(),
            final_commit_id: claim.final_commit_id,
            orig_commit_id: claim.orig_commit_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(b: u8) -> ObjectId {
        ObjectId::from_bytes_or_panic(&[b; 20])
    }

    #[test]
    fn split_divides_final_and_orig_ranges_together() {
        let mut store = HunkStore::new(10, PathBuf::from("f.txt"));
        let right = store.split_unclaimed(0, 4);
        assert_eq!(right, 1);
        assert_eq!(store.unclaimed()[0].final_range(), 0..4);
        assert_eq!(store.unclaimed()[1].final_range(), 4..10);
        assert_eq!(store.unclaimed()[1].orig_range(), 4..10);
    }

    #[test]
    fn split_at_zero_or_end_is_a_no_op() {
        let mut store = HunkStore::new(10, PathBuf::from("f.txt"));
        assert_eq!(store.split_unclaimed(0, 0), 0);
        assert_eq!(store.unclaimed().len(), 1);
        assert_eq!(store.split_unclaimed(0, 10), 0);
        assert_eq!(store.unclaimed().len(), 1);
    }

    #[test]
    fn claim_moves_hunk_and_preserves_coverage() {
        let mut store = HunkStore::new(5, PathBuf::from("f.txt"));
        store.claim(0, id(1), PathBuf::from("f.txt"));
        assert!(store.is_empty_unclaimed());
        assert!(store.is_complete());
        assert_eq!(store.claimed_count(), 1);
        let hunk = store.claimed_by_index(0).unwrap();
        assert_eq!(hunk.final_start_line_number(), 1);
        assert_eq!(hunk.lines_in_hunk(), 5);
    }

    #[test]
    fn claim_rest_drains_every_unclaimed_hunk() {
        let mut store = HunkStore::new(10, PathBuf::from("f.txt"));
        store.split_unclaimed(0, 4);
        store.claim_rest(id(9));
        assert!(store.is_empty_unclaimed());
        assert!(store.is_complete());
        assert_eq!(store.claimed_count(), 2);
    }
}
