//! End-to-end tests for the tool dispatcher and server envelope.
//!
//! These tests verify:
//! - Unknown tool names and invalid repository paths fail with the expected
//!   messages, wrapped as error envelopes at the server boundary
//! - Each of the seven tools produces the documented response text
//! - Commit messages carry the conventional-commit prefix
//! - A failed auto-push after commit is demoted to an appended warning
//! - Log rendering (newest first, `<date> [<hash>] <message>`, "No log found.")

use std::fs;
use std::path::Path;

use commit_mcp::{CommitMcpServer, handle_tool_call};
use commit_test_utils::git::{bare_origin, commit_file, init_repo};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Create a temp dir holding a real repository with one commit.
fn repo_with_commit() -> TempDir {
    let temp = TempDir::new().unwrap();
    let repo = init_repo(temp.path());
    commit_file(&repo, "README.md", "# Test", "Initial commit");
    temp
}

fn head_message(path: &Path) -> String {
    let repo = git2::Repository::open(path).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    head.message().unwrap().to_string()
}

// ==========================================================================
// Dispatch and context resolution
// ==========================================================================

#[tokio::test]
async fn unknown_tool_fails_with_not_found() {
    let temp = repo_with_commit();

    let result = handle_tool_call(temp.path(), "git_blame", json!({})).await;

    assert!(result.is_err());
    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("Tool not found: git_blame"),
        "Expected 'Tool not found' error, got: {}",
        err_msg
    );
}

#[tokio::test]
async fn non_repository_path_fails() {
    let temp = TempDir::new().unwrap();

    let result = handle_tool_call(temp.path(), "git_status", json!({})).await;

    assert!(result.is_err());
    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("not a valid git repository"),
        "Expected repository validity error, got: {}",
        err_msg
    );
}

#[tokio::test]
async fn repo_path_argument_overrides_default_root() {
    let unrelated = TempDir::new().unwrap();
    let repo = repo_with_commit();

    // default_root is not a repository, but the explicit repoPath is
    let args = json!({"repoPath": repo.path().to_str().unwrap()});
    let result = handle_tool_call(unrelated.path(), "git_status", args).await;

    assert!(result.is_ok(), "got: {:?}", result.err());
}

#[tokio::test]
async fn null_arguments_are_accepted() {
    let temp = repo_with_commit();

    let result = handle_tool_call(temp.path(), "git_status", Value::Null).await;
    assert!(result.is_ok());
}

// ==========================================================================
// git_status / git_diff
// ==========================================================================

#[tokio::test]
async fn status_returns_structured_json_text() {
    let temp = repo_with_commit();

    let text = handle_tool_call(temp.path(), "git_status", json!({}))
        .await
        .unwrap();

    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["is_clean"], true);
    assert!(parsed["staged"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn diff_clean_tree_reports_no_changes() {
    let temp = repo_with_commit();

    let text = handle_tool_call(temp.path(), "git_diff", json!({}))
        .await
        .unwrap();
    assert_eq!(text, "No changes detected.");
}

#[tokio::test]
async fn diff_staged_flag_selects_index_diff() {
    let temp = repo_with_commit();
    fs::write(temp.path().join("staged.txt"), "payload\n").unwrap();

    handle_tool_call(temp.path(), "git_add", json!({"files": ["staged.txt"]}))
        .await
        .unwrap();

    let staged = handle_tool_call(temp.path(), "git_diff", json!({"staged": true}))
        .await
        .unwrap();
    assert!(staged.contains("+payload"), "diff was: {}", staged);

    // The same change is invisible in the working-tree diff
    let unstaged = handle_tool_call(temp.path(), "git_diff", json!({}))
        .await
        .unwrap();
    assert_eq!(unstaged, "No changes detected.");
}

// ==========================================================================
// git_add
// ==========================================================================

#[tokio::test]
async fn add_requires_files_argument() {
    let temp = repo_with_commit();

    let result = handle_tool_call(temp.path(), "git_add", json!({})).await;

    assert!(result.is_err());
    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("files"),
        "Expected missing-field error naming 'files', got: {}",
        err_msg
    );
}

#[tokio::test]
async fn add_all_confirms_staged_files() {
    let temp = repo_with_commit();
    fs::write(temp.path().join("new.txt"), "hello").unwrap();

    let text = handle_tool_call(temp.path(), "git_add", json!({"files": ["."]}))
        .await
        .unwrap();
    assert_eq!(text, "Successfully added: .");

    // Previously untracked file is now staged
    let status = handle_tool_call(temp.path(), "git_status", json!({}))
        .await
        .unwrap();
    let parsed: Value = serde_json::from_str(&status).unwrap();
    assert!(parsed["not_added"].as_array().unwrap().is_empty());
    assert!(
        parsed["staged"]
            .as_array()
            .unwrap()
            .iter()
            .any(|v| v == "new.txt")
    );
}

#[tokio::test]
async fn add_joins_file_list_in_confirmation() {
    let temp = repo_with_commit();
    fs::write(temp.path().join("a.txt"), "a").unwrap();
    fs::write(temp.path().join("b.txt"), "b").unwrap();

    let text = handle_tool_call(temp.path(), "git_add", json!({"files": ["a.txt", "b.txt"]}))
        .await
        .unwrap();
    assert_eq!(text, "Successfully added: a.txt, b.txt");
}

// ==========================================================================
// git_commit
// ==========================================================================

#[tokio::test]
async fn commit_builds_conventional_message() {
    let temp = repo_with_commit();
    fs::write(temp.path().join("f.txt"), "x").unwrap();
    handle_tool_call(temp.path(), "git_add", json!({"files": ["."]}))
        .await
        .unwrap();

    let text = handle_tool_call(
        temp.path(),
        "git_commit",
        json!({"type": "feat", "message": "x"}),
    )
    .await
    .unwrap();

    assert!(text.contains("Commit successful:"), "got: {}", text);
    assert!(text.contains("Summary:"));
    assert_eq!(head_message(temp.path()), "feat: x");
}

#[tokio::test]
async fn commit_with_scope_builds_scoped_message() {
    let temp = repo_with_commit();
    fs::write(temp.path().join("g.txt"), "y").unwrap();
    handle_tool_call(temp.path(), "git_add", json!({"files": ["."]}))
        .await
        .unwrap();

    handle_tool_call(
        temp.path(),
        "git_commit",
        json!({"type": "fix", "scope": "api", "message": "y"}),
    )
    .await
    .unwrap();

    assert_eq!(head_message(temp.path()), "fix(api): y");
}

#[tokio::test]
async fn commit_rejects_unknown_type() {
    let temp = repo_with_commit();

    let result = handle_tool_call(
        temp.path(),
        "git_commit",
        json!({"type": "wip", "message": "z"}),
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn commit_with_failed_push_still_succeeds() {
    let temp = repo_with_commit();
    fs::write(temp.path().join("h.txt"), "z").unwrap();
    handle_tool_call(temp.path(), "git_add", json!({"files": ["."]}))
        .await
        .unwrap();

    // No remote configured, so the requested auto-push must fail softly
    let text = handle_tool_call(
        temp.path(),
        "git_commit",
        json!({"type": "chore", "message": "z", "push": true}),
    )
    .await
    .unwrap();

    assert!(text.contains("Commit successful:"), "got: {}", text);
    assert!(text.contains("Push failed:"), "got: {}", text);
    assert_eq!(head_message(temp.path()), "chore: z");
}

#[tokio::test]
async fn commit_with_push_reports_push_success() {
    let temp = TempDir::new().unwrap();
    let work = temp.path().join("work");
    let remote = temp.path().join("remote.git");
    fs::create_dir(&work).unwrap();

    let repo = init_repo(&work);
    commit_file(&repo, "README.md", "# Test", "Initial commit");
    bare_origin(&repo, &remote);

    fs::write(work.join("i.txt"), "w").unwrap();
    handle_tool_call(&work, "git_add", json!({"files": ["."]}))
        .await
        .unwrap();

    let text = handle_tool_call(
        &work,
        "git_commit",
        json!({"type": "feat", "message": "w", "push": true}),
    )
    .await
    .unwrap();

    assert!(text.contains("Commit successful:"), "got: {}", text);
    assert!(text.contains("\nPush successful:"), "got: {}", text);
    assert!(!text.contains("Push failed"), "got: {}", text);

    // The bare remote received the new commit
    let bare = git2::Repository::open(&remote).unwrap();
    let pushed = bare.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(pushed.message().unwrap(), "feat: w");
}

#[tokio::test]
async fn commit_nothing_staged_fails() {
    let temp = repo_with_commit();

    let result = handle_tool_call(
        temp.path(),
        "git_commit",
        json!({"type": "chore", "message": "noop"}),
    )
    .await;

    assert!(result.is_err());
    let err_msg = result.unwrap_err().to_string();
    assert!(err_msg.contains("nothing to commit"), "got: {}", err_msg);
}

// ==========================================================================
// git_push / git_pull
// ==========================================================================

#[tokio::test]
async fn push_without_remote_reports_missing_origin() {
    let temp = repo_with_commit();

    let result = handle_tool_call(temp.path(), "git_push", json!({})).await;

    assert!(result.is_err());
    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("Remote 'origin' not found"),
        "got: {}",
        err_msg
    );
}

#[tokio::test]
async fn pull_without_remote_reports_named_remote() {
    let temp = repo_with_commit();

    let result = handle_tool_call(temp.path(), "git_pull", json!({"remote": "upstream"})).await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("upstream"));
}

// ==========================================================================
// git_log
// ==========================================================================

#[tokio::test]
async fn log_empty_history_reports_no_log() {
    let temp = TempDir::new().unwrap();
    init_repo(temp.path());

    let text = handle_tool_call(temp.path(), "git_log", json!({}))
        .await
        .unwrap();
    assert_eq!(text, "No log found.");
}

#[tokio::test]
async fn log_count_zero_reports_no_log() {
    let temp = repo_with_commit();

    let text = handle_tool_call(temp.path(), "git_log", json!({"count": 0}))
        .await
        .unwrap();
    assert_eq!(text, "No log found.");
}

#[tokio::test]
async fn log_renders_one_line_per_commit_newest_first() {
    let temp = TempDir::new().unwrap();
    let repo = init_repo(temp.path());
    commit_file(&repo, "a.txt", "a", "first");
    commit_file(&repo, "b.txt", "b", "second");
    commit_file(&repo, "c.txt", "c", "third");

    let text = handle_tool_call(temp.path(), "git_log", json!({"count": 3}))
        .await
        .unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("third"), "got: {}", lines[0]);
    assert!(lines[2].ends_with("first"), "got: {}", lines[2]);

    // Each line is `<date> [<7-char hash>] <message>`
    for line in &lines {
        let open = line.find('[').unwrap();
        let close = line.find(']').unwrap();
        assert_eq!(close - open - 1, 7, "short hash in line: {}", line);
        // RFC 3339 timestamp before the hash
        assert!(line[..open].contains('T'), "date in line: {}", line);
    }
}

#[tokio::test]
async fn log_defaults_to_five_commits() {
    let temp = TempDir::new().unwrap();
    let repo = init_repo(temp.path());
    for i in 0..7 {
        commit_file(&repo, &format!("f{i}.txt"), "x", &format!("commit {i}"));
    }

    let text = handle_tool_call(temp.path(), "git_log", json!({}))
        .await
        .unwrap();
    assert_eq!(text.lines().count(), 5);
}

// ==========================================================================
// Server envelope
// ==========================================================================

#[tokio::test]
async fn server_wraps_tool_failure_as_error_envelope() {
    let temp = repo_with_commit();
    let mut server = CommitMcpServer::new(temp.path().to_path_buf());
    server.initialize().await.unwrap();

    let request =
        r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"unknown_tool","arguments":{}}}"#;

    let response = server.handle_message(request).await.unwrap();
    let parsed: Value = serde_json::from_str(&response).unwrap();

    // Tool errors are returned as successful responses with isError: true
    assert!(parsed.get("error").is_none());
    assert_eq!(parsed["result"]["isError"], true);
    let text = parsed["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Tool not found"), "got: {}", text);
}

#[tokio::test]
async fn server_wraps_success_as_text_envelope() {
    let temp = repo_with_commit();
    let mut server = CommitMcpServer::new(temp.path().to_path_buf());
    server.initialize().await.unwrap();

    let request =
        r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"git_status","arguments":{}}}"#;

    let response = server.handle_message(request).await.unwrap();
    let parsed: Value = serde_json::from_str(&response).unwrap();

    assert!(parsed["result"].get("isError").is_none());
    assert_eq!(parsed["result"]["content"][0]["type"], "text");

    // The envelope text itself is the pretty-printed status JSON
    let text = parsed["result"]["content"][0]["text"].as_str().unwrap();
    let status: Value = serde_json::from_str(text).unwrap();
    assert_eq!(status["is_clean"], true);
}

#[tokio::test]
async fn server_reports_invalid_repo_inside_envelope() {
    let temp = TempDir::new().unwrap();
    let mut server = CommitMcpServer::new(temp.path().to_path_buf());
    server.initialize().await.unwrap();

    let request =
        r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"git_status","arguments":{}}}"#;

    let response = server.handle_message(request).await.unwrap();
    let parsed: Value = serde_json::from_str(&response).unwrap();

    assert_eq!(parsed["result"]["isError"], true);
    let text = parsed["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("not a valid git repository"), "got: {}", text);
}
