//! Repository-bound git client.
//!
//! A [`GitClient`] is constructed per invocation, bound to one repository
//! path, and dropped when the invocation completes. Opening the client is
//! also the repository-validity check.

use std::path::{Path, PathBuf};

use git2::{DiffFormat, ErrorCode, IndexAddOption, Repository, StatusOptions};
use serde::Serialize;

use crate::commits::{CommitInfo, list_recent_commits};
use crate::status::StatusSummary;
use crate::{Error, Result};

/// Outcome of a successful commit.
#[derive(Debug, Serialize)]
pub struct CommitOutcome {
    /// Short commit hash (7 characters)
    pub id: String,
    pub summary: CommitSummary,
}

/// Diffstat of a commit against its parent.
#[derive(Debug, Serialize)]
pub struct CommitSummary {
    pub branch: Option<String>,
    pub changes: usize,
    pub insertions: usize,
    pub deletions: usize,
}

/// Result of a push operation.
#[derive(Debug, Serialize)]
pub struct PushSummary {
    pub remote: String,
    pub branch: String,
}

/// Result of a pull operation.
#[derive(Debug, Serialize)]
pub struct PullSummary {
    pub remote: String,
    pub branch: String,
    pub summary: String,
}

/// Git client bound to a single repository.
pub struct GitClient {
    repo: Repository,
    path: PathBuf,
}

impl std::fmt::Debug for GitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitClient")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl GitClient {
    /// Opens the repository at `path`.
    ///
    /// Fails with [`Error::NotARepository`] when the path does not hold a
    /// git repository, which doubles as the dispatcher's validity check.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path).map_err(|_| Error::NotARepository {
            path: path.to_path_buf(),
        })?;
        Ok(Self {
            repo,
            path: path.to_path_buf(),
        })
    }

    /// Returns true when `path` holds a git repository.
    pub fn is_repository(path: &Path) -> bool {
        Repository::open(path).is_ok()
    }

    /// Returns the path this client was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Collects a structured status summary of the index and working tree.
    pub fn status(&self) -> Result<StatusSummary> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .renames_head_to_index(true);

        let statuses = self.repo.statuses(Some(&mut opts))?;

        let mut summary = StatusSummary {
            current: self.current_branch().ok(),
            ..Default::default()
        };

        for entry in statuses.iter() {
            let path = entry.path().unwrap_or("<invalid utf-8>").to_string();
            let s = entry.status();

            if s.is_conflicted() {
                summary.conflicted.push(path);
                continue;
            }
            if s.is_index_renamed() {
                summary.renamed.push(path.clone());
            } else if s.is_index_new() || s.is_index_modified() || s.is_index_deleted()
                || s.is_index_typechange()
            {
                summary.staged.push(path.clone());
            }
            if s.is_wt_new() {
                summary.not_added.push(path);
            } else if s.is_wt_deleted() {
                summary.deleted.push(path);
            } else if s.is_wt_modified() || s.is_wt_typechange() || s.is_wt_renamed() {
                summary.modified.push(path);
            }
        }

        Ok(summary.finalize())
    }

    /// Renders a unified diff as text.
    ///
    /// `staged` diffs HEAD against the index (`git diff --staged`); otherwise
    /// the index is diffed against the working tree. Returns an empty string
    /// when nothing changed.
    pub fn diff(&self, staged: bool) -> Result<String> {
        let diff = if staged {
            // On an unborn HEAD the staged diff is against the empty tree.
            let head_tree = self.head_tree()?;
            self.repo.diff_tree_to_index(head_tree.as_ref(), None, None)?
        } else {
            self.repo.diff_index_to_workdir(None, None)?
        };

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            match line.origin() {
                '+' | '-' | ' ' => text.push(line.origin()),
                _ => {}
            }
            text.push_str(std::str::from_utf8(line.content()).unwrap_or("<binary>"));
            true
        })?;

        Ok(text)
    }

    /// Stages the given paths.
    ///
    /// A `"."` entry stages all changes including deletions. An explicit
    /// path that no longer exists on disk stages its deletion.
    pub fn add(&self, files: &[String]) -> Result<()> {
        let mut index = self.repo.index()?;

        if files.iter().any(|f| f == ".") {
            index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
            index.update_all(["*"].iter(), None)?;
        } else {
            let workdir = self.repo.workdir();
            for file in files {
                let rel = Path::new(file);
                let on_disk = workdir.map(|w| w.join(rel).exists()).unwrap_or(false);
                if on_disk {
                    index.add_path(rel)?;
                } else {
                    index.remove_path(rel)?;
                }
            }
        }

        index.write()?;
        Ok(())
    }

    /// Commits the current index with `message`.
    ///
    /// Refuses to create an empty commit: when the index tree equals the
    /// HEAD tree the call fails with [`Error::NothingToCommit`]. The first
    /// commit on an unborn branch is supported.
    pub fn commit(&self, message: &str) -> Result<CommitOutcome> {
        let signature = self.repo.signature()?;
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                None
            }
            Err(e) => return Err(e.into()),
        };

        match &parent {
            Some(p) if p.tree_id() == tree_id => return Err(Error::NothingToCommit),
            None if index.is_empty() => return Err(Error::NothingToCommit),
            _ => {}
        }

        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        let stats = diff.stats()?;

        tracing::debug!(id = %oid, "Created commit");

        Ok(CommitOutcome {
            id: oid.to_string()[..7].to_string(),
            summary: CommitSummary {
                branch: self.current_branch().ok(),
                changes: stats.files_changed(),
                insertions: stats.insertions(),
                deletions: stats.deletions(),
            },
        })
    }

    /// Pushes a branch to a remote.
    ///
    /// `remote` defaults to "origin"; `branch` defaults to the current
    /// branch. A detached HEAD with no explicit branch is an error.
    pub fn push(&self, remote: Option<&str>, branch: Option<&str>) -> Result<PushSummary> {
        let remote_name = remote.unwrap_or("origin");
        let branch_name = match branch {
            Some(b) => b.to_string(),
            None => self.current_branch()?,
        };

        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| Error::RemoteNotFound {
                name: remote_name.to_string(),
            })?;

        let refspec = format!("refs/heads/{}:refs/heads/{}", branch_name, branch_name);
        remote
            .push(&[&refspec], None)
            .map_err(|e| Error::PushFailed {
                message: e.message().to_string(),
            })?;

        tracing::debug!(remote = %remote_name, branch = %branch_name, "Pushed branch");

        Ok(PushSummary {
            remote: remote_name.to_string(),
            branch: branch_name,
        })
    }

    /// Pulls a branch from a remote using fetch + fast-forward.
    ///
    /// Diverged histories are not merged implicitly; they fail with
    /// [`Error::CannotFastForward`].
    pub fn pull(&self, remote: Option<&str>, branch: Option<&str>) -> Result<PullSummary> {
        let remote_name = remote.unwrap_or("origin");
        let branch_name = match branch {
            Some(b) => b.to_string(),
            None => self.current_branch()?,
        };

        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| Error::RemoteNotFound {
                name: remote_name.to_string(),
            })?;

        remote
            .fetch(&[&branch_name], None, None)
            .map_err(|e| Error::PullFailed {
                message: format!("Fetch failed: {}", e.message()),
            })?;

        let fetch_head = self
            .repo
            .find_reference("FETCH_HEAD")
            .map_err(|e| Error::PullFailed {
                message: format!("Could not find FETCH_HEAD: {}", e.message()),
            })?;
        let fetch_commit = fetch_head.peel_to_commit().map_err(|e| Error::PullFailed {
            message: format!("Could not resolve FETCH_HEAD: {}", e.message()),
        })?;

        let head_commit = self.repo.head()?.peel_to_commit()?;

        let (analysis, _) = self
            .repo
            .merge_analysis(&[&self.repo.find_annotated_commit(fetch_commit.id())?])?;

        if analysis.is_up_to_date() {
            return Ok(PullSummary {
                remote: remote_name.to_string(),
                branch: branch_name,
                summary: "Already up to date.".to_string(),
            });
        }

        if analysis.is_fast_forward() {
            let refname = format!("refs/heads/{}", branch_name);
            let mut reference = self.repo.find_reference(&refname)?;
            reference.set_target(
                fetch_commit.id(),
                &format!("pull: fast-forward to {}", fetch_commit.id()),
            )?;
            self.repo
                .checkout_head(Some(git2::build::CheckoutBuilder::default().force()))?;

            return Ok(PullSummary {
                remote: remote_name.to_string(),
                branch: branch_name,
                summary: format!("Fast-forwarded to {}", &fetch_commit.id().to_string()[..7]),
            });
        }

        Err(Error::CannotFastForward {
            message: format!(
                "Cannot fast-forward {} from {} to {}. Manual merge required.",
                branch_name,
                head_commit.id(),
                fetch_commit.id()
            ),
        })
    }

    /// Returns the most recent commits, newest first, at most `max_count`.
    ///
    /// An unborn HEAD (no commits yet) yields an empty list.
    pub fn log(&self, max_count: usize) -> Result<Vec<CommitInfo>> {
        list_recent_commits(&self.repo, max_count)
    }

    /// Current branch name, or an error when HEAD is detached or unborn.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if head.is_branch() {
            Ok(head.shorthand().unwrap_or("HEAD").to_string())
        } else {
            Err(Error::DetachedHead)
        }
    }

    /// HEAD tree, or `None` on an unborn branch.
    fn head_tree(&self) -> Result<Option<git2::Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_tree()?)),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
