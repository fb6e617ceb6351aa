//! MCP Tool Handlers
//!
//! Dispatches tool calls to the git client and normalizes results into
//! human-readable text. Each invocation resolves its own repository path and
//! opens its own [`GitClient`]; nothing is shared across calls.
//!
//! Note: Handler functions use `async fn` for consistency with the MCP
//! server's tokio runtime, even though the current implementations perform
//! synchronous git I/O. This allows for future migration to async operations
//! without API changes.

use std::fmt;
use std::path::{Path, PathBuf};

use commit_git::GitClient;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{Error, Result};

/// Handle a tool call by dispatching to the appropriate handler.
///
/// Resolves the repository path (explicit `repoPath` argument, falling back
/// to `default_root`), verifies it holds a git repository by opening the
/// client, then routes on `tool_name`. Unknown names fail with
/// [`Error::UnknownTool`].
pub async fn handle_tool_call(
    default_root: &Path,
    tool_name: &str,
    arguments: Value,
) -> Result<String> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };

    let repo_path = resolve_repo_path(&arguments, default_root);
    let client = GitClient::open(&repo_path)?;

    match tool_name {
        "git_status" => handle_status(&client).await,
        "git_diff" => handle_diff(&client, arguments).await,
        "git_add" => handle_add(&client, arguments).await,
        "git_commit" => handle_commit(&client, arguments).await,
        "git_push" => handle_push(&client, arguments).await,
        "git_pull" => handle_pull(&client, arguments).await,
        "git_log" => handle_log(&client, arguments).await,

        _ => Err(Error::UnknownTool(tool_name.to_string())),
    }
}

/// Resolve the repository path for one invocation.
///
/// A present, non-empty `repoPath` argument wins; otherwise the server's
/// fallback root applies. Resolved once per call, never mutated afterwards.
fn resolve_repo_path(arguments: &Value, default_root: &Path) -> PathBuf {
    arguments
        .get("repoPath")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| default_root.to_path_buf())
}

// ============================================================================
// Status / Diff
// ============================================================================

/// Handle git_status - serialize the structured status as indented text
async fn handle_status(client: &GitClient) -> Result<String> {
    let status = client.status()?;
    Ok(serde_json::to_string_pretty(&status)?)
}

/// Arguments for git_diff
#[derive(Debug, Default, Deserialize)]
struct GitDiffArgs {
    #[serde(default)]
    staged: bool,
}

/// Handle git_diff - working tree diff, or the staged diff with `staged`
async fn handle_diff(client: &GitClient, arguments: Value) -> Result<String> {
    let args: GitDiffArgs =
        serde_json::from_value(arguments).map_err(|e| Error::InvalidArgument(e.to_string()))?;

    let diff = client.diff(args.staged)?;
    if diff.is_empty() {
        Ok("No changes detected.".to_string())
    } else {
        Ok(diff)
    }
}

// ============================================================================
// Add / Commit
// ============================================================================

/// Arguments for git_add
#[derive(Debug, Deserialize)]
struct GitAddArgs {
    files: Vec<String>,
}

/// Handle git_add - stage exactly the given files; `["."]` means everything
async fn handle_add(client: &GitClient, arguments: Value) -> Result<String> {
    let args: GitAddArgs =
        serde_json::from_value(arguments).map_err(|e| Error::InvalidArgument(e.to_string()))?;

    client.add(&args.files)?;
    Ok(format!("Successfully added: {}", args.files.join(", ")))
}

/// Conventional-commit type prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Style,
    Refactor,
    Docs,
    Chore,
    Test,
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Style => "style",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Chore => "chore",
            Self::Test => "test",
        };
        f.write_str(s)
    }
}

/// Arguments for git_commit
#[derive(Debug, Deserialize)]
struct GitCommitArgs {
    #[serde(rename = "type")]
    commit_type: CommitType,
    #[serde(default)]
    scope: Option<String>,
    message: String,
    #[serde(default)]
    push: bool,
}

impl GitCommitArgs {
    /// Builds `type: message` or `type(scope): message`.
    fn full_message(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{}({}): {}", self.commit_type, scope, self.message),
            None => format!("{}: {}", self.commit_type, self.message),
        }
    }
}

/// Handle git_commit - commit with a conventional prefix, optional auto-push.
///
/// A requested push that fails is demoted to an appended "Push failed" line;
/// the commit itself is still reported as a success.
async fn handle_commit(client: &GitClient, arguments: Value) -> Result<String> {
    let args: GitCommitArgs =
        serde_json::from_value(arguments).map_err(|e| Error::InvalidArgument(e.to_string()))?;

    let outcome = client.commit(&args.full_message())?;

    let mut text = format!(
        "Commit successful: {}\nSummary: {}",
        outcome.id,
        serde_json::to_string(&outcome.summary)?
    );

    if args.push {
        match client.push(None, None) {
            Ok(summary) => {
                text.push_str(&format!(
                    "\nPush successful: {}",
                    serde_json::to_string(&summary)?
                ));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Auto-push after commit failed");
                text.push_str(&format!("\nPush failed: {}", e));
            }
        }
    }

    Ok(text)
}

// ============================================================================
// Push / Pull
// ============================================================================

/// Arguments for git_push
#[derive(Debug, Default, Deserialize)]
struct GitPushArgs {
    #[serde(default)]
    remote: Option<String>,
    #[serde(default)]
    branch: Option<String>,
}

/// Handle git_push - push to a remote (defaults to origin / current branch)
async fn handle_push(client: &GitClient, arguments: Value) -> Result<String> {
    let args: GitPushArgs =
        serde_json::from_value(arguments).map_err(|e| Error::InvalidArgument(e.to_string()))?;

    let summary = client.push(args.remote.as_deref(), args.branch.as_deref())?;
    Ok(format!(
        "Push successful: {}",
        serde_json::to_string(&summary)?
    ))
}

/// Arguments for git_pull
#[derive(Debug, Default, Deserialize)]
struct GitPullArgs {
    #[serde(default)]
    remote: Option<String>,
    #[serde(default)]
    branch: Option<String>,
}

/// Handle git_pull - pull from a remote (defaults to origin / current branch)
async fn handle_pull(client: &GitClient, arguments: Value) -> Result<String> {
    let args: GitPullArgs =
        serde_json::from_value(arguments).map_err(|e| Error::InvalidArgument(e.to_string()))?;

    let summary = client.pull(args.remote.as_deref(), args.branch.as_deref())?;
    Ok(format!(
        "Pull successful: {}",
        serde_json::to_string(&summary)?
    ))
}

// ============================================================================
// Log
// ============================================================================

/// Arguments for git_log
#[derive(Debug, Deserialize)]
struct GitLogArgs {
    #[serde(default = "default_log_count")]
    count: usize,
}

fn default_log_count() -> usize {
    5
}

/// Handle git_log - render recent commits, newest first.
///
/// The default of 5 applies only when `count` is absent; an explicit 0 asks
/// for no commits and therefore reports an empty log.
async fn handle_log(client: &GitClient, arguments: Value) -> Result<String> {
    let args: GitLogArgs =
        serde_json::from_value(arguments).map_err(|e| Error::InvalidArgument(e.to_string()))?;

    let commits = client.log(args.count)?;
    if commits.is_empty() {
        return Ok("No log found.".to_string());
    }

    let lines: Vec<String> = commits
        .iter()
        .map(|c| format!("{} [{}] {}", c.timestamp.to_rfc3339(), c.hash, c.message))
        .collect();
    Ok(lines.join("\n"))
}
