//! Error types for commit-git

use std::path::PathBuf;

/// Result type for commit-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in commit-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("\"{}\" is not a valid git repository", path.display())]
    NotARepository { path: PathBuf },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("HEAD is detached, specify a branch explicitly")]
    DetachedHead,

    #[error("push rejected: {message}")]
    PushFailed { message: String },

    #[error("Pull failed: {message}")]
    PullFailed { message: String },

    #[error("Cannot fast-forward: {message}")]
    CannotFastForward { message: String },

    #[error("nothing to commit, working tree clean")]
    NothingToCommit,
}
