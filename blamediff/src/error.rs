#[derive(Debug, thiserror::Error)]
pub enum BlameDiffError {
    #[error("no path given to blame")]
    BadArgs,
    #[error(transparent)]
    Blame(#[from] blame::Error),
    #[error(transparent)]
    Discover(#[from] gix::discover::Error),
    #[error(transparent)]
    HeadCommit(#[from] gix::reference::head_commit::Error),
    #[error(transparent)]
    Parse(#[from] gix::revision::spec::parse::single::Error),
    #[error(transparent)]
    FindObject(#[from] gix::object::find::existing::Error),
    #[error(transparent)]
    ObtainCommit(#[from] gix::object::find::existing::with_conversion::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
