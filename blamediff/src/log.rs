//! `blamediff log <path>`: print every commit that actually touched
//! `path`'s blob, the cheap way `blame`'s diff driver does (compare the
//! entry at `path` between a commit and its successor in the walk).

use gix::Repository;

pub fn log(repo: &Repository, path: &std::path::Path) -> anyhow::Result<()> {
    let head = repo.rev_parse_single("HEAD")?;
    let mut iter = repo.rev_walk(std::iter::once(head.detach())).all()?.peekable();

    while let Some(commit_id) = iter.next() {
        let commit_id = commit_id?.id;
        let commit = repo.find_object(commit_id)?.into_commit();
        let entry = commit.tree()?.lookup_entry_by_path(path)?;

        let Some(entry) = entry else { continue };

        let changed = match iter.peek() {
            Some(Ok(parent)) => {
                let parent_commit = repo.find_object(parent.id)?.into_commit();
                let parent_entry = parent_commit.tree()?.lookup_entry_by_path(path)?;
                parent_entry.is_none_or(|p| p.object_id() != entry.object_id())
            }
            _ => true,
        };

        if changed {
            println!("{} {}", commit.id, commit.message()?.summary());
        }
    }

    Ok(())
}
