//! C6: the top-level `blame_file` walk (spec.md §4.4).

use std::path::Path;

use crate::diff_driver;
use crate::error::{Error, Result};
use crate::hunk::HunkStore;
use crate::line_index::LineIndex;
use crate::matcher::Matcher;
use crate::path_set::PathSet;
use crate::store::{DiffEngine, ObjectStore, RevisionWalk};
use crate::{BlameResult, Hunk, Options};

pub(crate) fn blame_file(
    store: &dyn ObjectStore,
    revwalk: &dyn RevisionWalk,
    diff: &dyn DiffEngine,
    path: &Path,
    options: &Options,
) -> Result<BlameResult> {
    let newest = match options.newest_commit {
        Some(id) => id,
        None => store.resolve_head()?,
    };

    let newest_tree = store.commit_tree(newest)?;
    let target_blob = store.blob_at_path(newest_tree, path)?.ok_or_else(|| Error::NotFound {
        revision: newest.to_string(),
        path: path.to_owned(),
    })?;
    let content = store.blob_content(target_blob)?;
    let line_index = LineIndex::new(content);

    let mut path_set = PathSet::new(path.to_owned());
    let mut hunk_store = HunkStore::new(line_index.line_count(), path.to_owned());
    let matcher = Matcher::new(options.policy);
    let track_renames = diff_driver::track_renames(options.flags);

    let mut last_visited = newest;
    let mut iter = revwalk.walk(newest, options.oldest_commit)?;

    while !hunk_store.is_empty_unclaimed() {
        let Some(commit_id) = iter.next().transpose()? else {
            break;
        };
        last_visited = commit_id;

        let info = store.commit_info(commit_id)?;
        let commit_tree = store.commit_tree(commit_id)?;

        // Merge commits fall back to their first parent only (spec.md §1).
        let parent = info.parents.first().copied();
        let parent_diffs = match parent {
            Some(parent_id) => {
                let parent_tree = store.commit_tree(parent_id)?;
                let diffs = diff_driver::relevant_diffs(
                    store,
                    diff,
                    &mut path_set,
                    Some(parent_tree),
                    commit_tree,
                    track_renames,
                )?;
                Some((parent_id, diffs))
            }
            None => None,
        };

        matcher.process_commit(
            &mut hunk_store,
            &line_index,
            commit_id,
            parent_diffs.as_ref().map(|(id, diffs)| (*id, diffs)),
        );
    }

    // Walk exhausted (an `oldest_commit` bound, or a shallow/grafted
    // history) before every hunk found a root commit: attribute whatever
    // remains to the last commit actually visited.
    if !hunk_store.is_empty_unclaimed() {
        hunk_store.claim_rest(last_visited);
    }

    if !hunk_store.is_complete() {
        return Err(Error::Incomplete(last_visited));
    }
    let hunks: Vec<Hunk> = hunk_store.claimed_iter().collect();
    Ok(BlameResult::new(hunks))
}
