use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use gix::date::time::format;

mod error;
mod log;

use error::BlameDiffError;

#[derive(Args)]
struct BlameArgs {
    /// Revision to start the walk from; defaults to HEAD.
    #[arg(short, long)]
    revision: Option<String>,

    /// Stop the walk at (and excluding the ancestors of) this revision.
    #[arg(short, long)]
    oldest: Option<String>,

    /// Don't follow the file across renames (renames are followed by default).
    #[arg(short = 'M', long)]
    no_renames: bool,

    path: PathBuf,
}

#[derive(Args)]
struct LogArgs {
    path: PathBuf,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Blame a file, newest revision to oldest.
    Blame(BlameArgs),
    /// Print every commit that changed a path's content.
    Log(LogArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();
    match args.command {
        Command::Blame(ba) => cmd_blame(ba),
        Command::Log(la) => cmd_log(la),
    }
}

fn cmd_log(la: LogArgs) -> anyhow::Result<()> {
    let repo = gix::discover(".")?;
    log::log(&repo, &la.path)
}

fn cmd_blame(ba: BlameArgs) -> anyhow::Result<()> {
    if ba.path.as_os_str().is_empty() {
        return Err(BlameDiffError::BadArgs.into());
    }

    let repo = gix::discover(".")?;

    let newest_commit = ba
        .revision
        .as_deref()
        .map(|r| repo.rev_parse_single(r).map(|id| id.detach()))
        .transpose()
        .map_err(BlameDiffError::from)?;
    let oldest_commit = ba
        .oldest
        .as_deref()
        .map(|r| repo.rev_parse_single(r).map(|id| id.detach()))
        .transpose()
        .map_err(BlameDiffError::from)?;

    let mut flags = blame::Options::default().flags;
    if ba.no_renames {
        flags.remove(blame::Flags::TRACK_FILE_RENAMES);
    }

    let options = blame::Options {
        newest_commit,
        oldest_commit,
        flags,
        policy: blame::Policy::Passing,
    };

    let backend = blame::GixBackend::new(repo.clone());
    let result = blame::blame_file(&backend, &backend, &backend, &ba.path, &options).map_err(BlameDiffError::from)?;

    let target_commit = newest_commit
        .map(Ok)
        .unwrap_or_else(|| repo.head_commit().map(|c| c.id))
        .map_err(BlameDiffError::from)?;
    let target_tree = repo.find_commit(target_commit)?.tree()?;
    let blob_id = target_tree
        .lookup_entry_by_path(&ba.path)?
        .ok_or(BlameDiffError::BadArgs)?
        .object_id();
    let content = repo.find_blob(blob_id)?.data.clone();
    let lines: Vec<&[u8]> = content.split(|&b| b == b'\n').collect();

    for hunk in result.iter() {
        let commit = repo.find_object(hunk.final_commit_id())?.into_commit();
        let author = commit.author().context("getting commit author")?;
        let timestamp = author
            .time()
            .context("parsing author timestamp")?
            .format(format::ISO8601)
            .context("formatting author timestamp")?;
        let short_hash = commit.id.to_hex_with_len(8);

        for line_no in 0..hunk.lines_in_hunk() {
            let line_number = hunk.final_start_line_number() + line_no;
            let text = lines.get(line_number as usize - 1).copied().unwrap_or_default();
            println!(
                "{short_hash} ({} {timestamp} {line_number:4}) {}",
                author.name,
                String::from_utf8_lossy(text),
            );
        }
    }

    Ok(())
}
