//! C4: per-commit diff orchestration (spec.md §4.3/§4.4/§4.6).
//!
//! For one commit/parent pair, runs the cheap pathspec-filtered tree diff
//! first; only re-requests the full, unfiltered diff (with rename
//! detection) when the filtered diff actually touched a tracked path and
//! the caller asked for rename tracking. Grows the [`PathSet`] when a
//! rename is discovered so later (older) commits keep matching the file
//! under its earlier name.

use gix::ObjectId;

use crate::error::Result;
use crate::path_set::PathSet;
use crate::store::{Delta, DiffEngine, DiffHunk, ObjectStore};
use crate::Flags;

/// The diffs relevant to the blamed path(s), for one commit against one
/// parent, with line-level hunks already computed.
pub(crate) fn relevant_diffs(
    store: &dyn ObjectStore,
    diff: &dyn DiffEngine,
    paths: &mut PathSet,
    parent_tree: Option<ObjectId>,
    commit_tree: ObjectId,
    track_renames: bool,
) -> Result<Vec<(Delta, Vec<DiffHunk>)>> {
    let pathspec = paths.as_vec();
    let filtered = diff.tree_diff(parent_tree, Some(commit_tree), Some(&pathspec))?;
    if filtered.is_empty() {
        return Ok(Vec::new());
    }

    let deltas = if track_renames {
        let unfiltered = diff.tree_diff(parent_tree, Some(commit_tree), None)?;
        unfiltered
            .into_iter()
            .filter(|d| paths.contains(&d.new_path) || d.old_path.as_deref().is_some_and(|p| paths.contains(p)))
            .collect()
    } else {
        filtered
    };

    let mut out = Vec::with_capacity(deltas.len());
    for delta in deltas {
        if let Some(old_path) = &delta.old_path {
            if old_path != &delta.new_path {
                paths.insert(old_path.clone());
            }
        }

        let old_content = match delta.old_blob {
            Some(id) => store.blob_content(id)?,
            None => Vec::new(),
        };
        let new_content = match delta.new_blob {
            Some(id) => store.blob_content(id)?,
            None => Vec::new(),
        };
        let hunks = diff.blob_diff(&old_content, &new_content);
        out.push((delta, hunks));
    }

    Ok(out)
}

pub(crate) fn track_renames(flags: Flags) -> bool {
    flags.contains(Flags::TRACK_FILE_RENAMES)
}
