//! Git abstraction for the git-commit MCP server
//!
//! Wraps libgit2 behind a small client bound to a single repository path.
//! The MCP layer never touches git2 directly.

pub mod client;
pub mod commits;
pub mod error;
pub mod status;

pub use client::{CommitOutcome, CommitSummary, GitClient, PullSummary, PushSummary};
pub use commits::{CommitInfo, list_recent_commits};
pub use error::{Error, Result};
pub use status::StatusSummary;
