//! Recent commit history extraction from git repositories.

use chrono::{DateTime, TimeZone, Utc};
use git2::{ErrorCode, Repository};

use crate::Result;

/// Information about a single commit.
#[derive(Debug)]
pub struct CommitInfo {
    /// Short commit hash (7 characters)
    pub hash: String,

    /// First line of the commit message
    pub message: String,

    /// Commit author name
    pub author: String,

    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

/// Extract the last `max_count` commits reachable from HEAD.
///
/// Performs a time-sorted revwalk and returns commits in
/// reverse-chronological order (most recent first). A repository with no
/// commits yet yields an empty list.
pub fn list_recent_commits(repo: &Repository, max_count: usize) -> Result<Vec<CommitInfo>> {
    let head_commit = match repo.head() {
        Ok(head) => head.peel_to_commit()?,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut revwalk = repo.revwalk()?;
    revwalk.push(head_commit.id())?;
    revwalk.set_sorting(git2::Sort::TIME)?;

    let mut commits = Vec::with_capacity(max_count);

    for oid_result in revwalk.take(max_count) {
        let oid = oid_result?;
        let commit = repo.find_commit(oid)?;

        let timestamp = commit.time();
        let dt: DateTime<Utc> = Utc
            .timestamp_opt(timestamp.seconds(), 0)
            .single()
            .unwrap_or_default();

        let message = commit
            .message()
            .unwrap_or("")
            .lines()
            .next()
            .unwrap_or("")
            .to_string();

        let author = commit.author();
        let author_name = author.name().unwrap_or("Unknown").to_string();

        commits.push(CommitInfo {
            hash: oid.to_string()[..7].to_string(),
            message,
            author: author_name,
            timestamp: dt,
        });
    }

    Ok(commits)
}
