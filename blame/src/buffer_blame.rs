//! C7: buffer-blame (spec.md §4.7). Overlays an in-memory buffer on a
//! prior, fully-resolved [`BlameResult`], without walking history again.

use gix::ObjectId;

use crate::store::DiffEngine;
use crate::{BlameResult, Hunk};

/// All-zero id marking a hunk as locally modified in the buffer, never
/// attributed to a real commit (spec.md §4.7's buffer-hunk marker).
pub fn zero_id() -> ObjectId {
    ObjectId::null(gix::hash::Kind::Sha1)
}

pub(crate) fn blame_buffer(base: &BlameResult, base_content: &[u8], buffer: &[u8], diff: &dyn DiffEngine) -> BlameResult {
    let mut hunks: Vec<Hunk> = base.iter().cloned().collect();

    for diff_hunk in diff.blob_diff(base_content, buffer) {
        let wedge = diff_hunk.wedge();
        let mut idx = find_by_final(&hunks, wedge).unwrap_or_else(|| hunks.len().saturating_sub(1));
        if wedge > hunks[idx].final_start {
            let offset = wedge - hunks[idx].final_start;
            idx = split_at(&mut hunks, idx, offset);
        }

        let current_diff_line = wedge;

        for _ in 0..diff_hunk.old_lines {
            hunks[idx].lines -= 1;
            if hunks[idx].lines == 0 {
                hunks.remove(idx);
            }
            shift_final_from(&mut hunks, current_diff_line, -1);
        }

        for line in current_diff_line..current_diff_line + diff_hunk.additions.len() as u32 {
            let extend_existing = hunks
                .get(idx)
                .is_some_and(|h| h.final_commit_id == zero_id() && h.final_start + h.lines <= line);

            if extend_existing {
                hunks[idx].lines += 1;
                shift_final_from(&mut hunks, line, 1);
            } else {
                shift_final_from(&mut hunks, line, 1);
                let orig_path = hunks.get(idx).or_else(|| hunks.last()).map(|h| h.orig_path.clone()).unwrap_or_default();
                hunks.insert(
                    idx,
                    Hunk {
                        final_start: line,
                        lines: 1,
                        orig_start: line,
                        orig_path,
                        final_commit_id: zero_id(),
                        orig_commit_id: zero_id(),
                    },
                );
                // `idx` now names the hunk just inserted, not the one after
                // it: the next addition line must see this zero-id hunk to
                // extend it instead of inserting a second one.
            }
        }
    }

    BlameResult::new(hunks)
}

fn find_by_final(hunks: &[Hunk], line: u32) -> Option<usize> {
    hunks
        .binary_search_by(|h| {
            if line < h.final_start {
                std::cmp::Ordering::Greater
            } else if line >= h.final_start + h.lines {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .ok()
}

fn split_at(hunks: &mut Vec<Hunk>, idx: usize, r: u32) -> usize {
    let h = &hunks[idx];
    if r == 0 || r >= h.lines {
        return idx;
    }
    let right = Hunk {
        final_start: h.final_start + r,
        lines: h.lines - r,
        orig_start: h.orig_start + r,
        orig_path: h.orig_path.clone(),
        final_commit_id: h.final_commit_id,
        orig_commit_id: h.orig_commit_id,
    };
    hunks[idx].lines = r;
    hunks.insert(idx + 1, right);
    idx + 1
}

fn shift_final_from(hunks: &mut [Hunk], from: u32, delta: i64) {
    for h in hunks.iter_mut() {
        if h.final_start >= from {
            h.final_start = (h.final_start as i64 + delta) as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::DiffHunk;

    fn id(b: u8) -> ObjectId {
        ObjectId::from_bytes_or_panic(&[b; 20])
    }

    struct LineDiff;

    impl DiffEngine for LineDiff {
        fn tree_diff(
            &self,
            _old_tree: Option<ObjectId>,
            _new_tree: Option<ObjectId>,
            _pathspec: Option<&[std::path::PathBuf]>,
        ) -> crate::Result<Vec<crate::store::Delta>> {
            unimplemented!("buffer-blame never tree-diffs")
        }

        fn blob_diff(&self, old: &[u8], new: &[u8]) -> Vec<DiffHunk> {
            crate::gix_backend::line_diff(old, new)
        }
    }

    fn hunk(final_start: u32, lines: u32, commit: ObjectId) -> Hunk {
        Hunk {
            final_start,
            lines,
            orig_start: final_start,
            orig_path: PathBuf::from("f.txt"),
            final_commit_id: commit,
            orig_commit_id: commit,
        }
    }

    #[test]
    fn insertion_splits_in_a_new_locally_modified_hunk() {
        let base = BlameResult::new(vec![hunk(0, 1, id(1)), hunk(1, 1, id(2))]);
        let result = blame_buffer(&base, b"hi\nbye!\n", b"hi\nFOO\nbye!\n", &LineDiff);
        let hunks: Vec<_> = result.iter().collect();
        assert_eq!(hunks.len(), 3);
        assert_eq!(hunks[0].final_commit_id(), id(1));
        assert_eq!(hunks[1].final_commit_id(), zero_id());
        assert_eq!(hunks[2].final_commit_id(), id(2));
        assert_eq!(hunks[2].final_start_line_number(), 3);
    }

    #[test]
    fn deletion_removes_the_emptied_hunk() {
        let base = BlameResult::new(vec![hunk(0, 1, id(1)), hunk(1, 1, id(2))]);
        let result = blame_buffer(&base, b"hi\nbye!\n", b"hi\n", &LineDiff);
        let hunks: Vec<_> = result.iter().collect();
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].final_commit_id(), id(1));
    }

    #[test]
    fn idempotent_on_unchanged_content() {
        let base = BlameResult::new(vec![hunk(0, 2, id(1))]);
        let result = blame_buffer(&base, b"a\nb\n", b"a\nb\n", &LineDiff);
        let hunks: Vec<_> = result.iter().collect();
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].final_commit_id(), id(1));
        assert_eq!(hunks[0].lines_in_hunk(), 2);
    }
}
