use std::path::PathBuf;

use gix::ObjectId;

/// The error taxonomy of the blame engine (spec §7).
///
/// `oom` has no safe-Rust representation (allocation failure aborts the
/// process) and `iter_over` never escapes the walk loop, so neither is a
/// variant here; see `DESIGN.md`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was missing or malformed (empty path, a path that
    /// resolves to something other than a blob, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `path` did not exist at `revision`, or `revision` itself could not be
    /// resolved.
    #[error("{path} not found at {revision}")]
    NotFound { revision: String, path: PathBuf },

    /// The underlying object store failed.
    #[error("object store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The underlying diff engine failed.
    #[error("diff engine error: {0}")]
    Diff(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The blame did not converge: after the walk terminated, some lines of
    /// the target file were still unclaimed. This should never happen for a
    /// correctly implemented matcher; it is kept as a defensive error rather
    /// than a panic.
    #[error("blame did not converge: unclaimed lines remain after commit {0}")]
    Incomplete(ObjectId),
}

pub type Result<T> = std::result::Result<T, Error>;
