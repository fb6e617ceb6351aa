//! Git repository fixtures.
//!
//! All fixtures build real repositories through git2 so the test suite does
//! not depend on a `git` binary or on global git configuration.

use std::fs;
use std::path::Path;

use git2::Repository;

/// Initialises a real git repository with repo-local committer identity.
///
/// The local `user.name` / `user.email` config makes `Repository::signature`
/// work on machines without global git configuration.
///
/// # Panics
/// Panics if the repository cannot be initialised or configured.
pub fn init_repo(path: &Path) -> Repository {
    let repo = Repository::init(path)
        .unwrap_or_else(|e| panic!("init_repo: failed to init repository at {}: {e}", path.display()));
    configure_identity(&repo);
    repo
}

/// Clones the repository at `source` (a local path, typically a bare remote
/// created by [`bare_origin`]) into `path`, with repo-local committer
/// identity. The clone keeps `source` registered as `origin`.
///
/// # Panics
/// Panics if the clone fails.
pub fn clone_repo(source: &Path, path: &Path) -> Repository {
    let url = source
        .to_str()
        .unwrap_or_else(|| panic!("clone_repo: source path is not valid UTF-8"));
    let repo = Repository::clone(url, path).unwrap_or_else(|e| {
        panic!(
            "clone_repo: failed to clone {} into {}: {e}",
            source.display(),
            path.display()
        )
    });
    configure_identity(&repo);
    repo
}

fn configure_identity(repo: &Repository) {
    let mut config = repo
        .config()
        .unwrap_or_else(|e| panic!("configure_identity: failed to open config: {e}"));
    config
        .set_str("user.name", "Test User")
        .unwrap_or_else(|e| panic!("configure_identity: failed to set user.name: {e}"));
    config
        .set_str("user.email", "test@test.com")
        .unwrap_or_else(|e| panic!("configure_identity: failed to set user.email: {e}"));
}

/// Writes `name` with `content` in the repository's working tree, stages it,
/// and commits with `message`. Works for both the first and subsequent
/// commits.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> git2::Oid {
    let workdir = repo
        .workdir()
        .unwrap_or_else(|| panic!("commit_file: repository has no working tree"));
    fs::write(workdir.join(name), content)
        .unwrap_or_else(|e| panic!("commit_file: failed to write {name}: {e}"));

    let mut index = repo
        .index()
        .unwrap_or_else(|e| panic!("commit_file: failed to open index: {e}"));
    index
        .add_path(Path::new(name))
        .unwrap_or_else(|e| panic!("commit_file: failed to stage {name}: {e}"));
    index
        .write()
        .unwrap_or_else(|e| panic!("commit_file: failed to write index: {e}"));

    let tree_id = index
        .write_tree()
        .unwrap_or_else(|e| panic!("commit_file: failed to write tree: {e}"));
    let tree = repo
        .find_tree(tree_id)
        .unwrap_or_else(|e| panic!("commit_file: failed to find tree: {e}"));
    let sig = repo
        .signature()
        .unwrap_or_else(|e| panic!("commit_file: failed to build signature: {e}"));

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap_or_else(|e| panic!("commit_file: failed to commit: {e}"))
}

/// Initialises a bare repository at `remote_path` and registers it as the
/// `origin` remote of `repo`. Local-filesystem remotes keep push/pull tests
/// fully offline.
///
/// # Panics
/// Panics if the bare repository cannot be created or the remote added.
pub fn bare_origin(repo: &Repository, remote_path: &Path) {
    Repository::init_bare(remote_path).unwrap_or_else(|e| {
        panic!(
            "bare_origin: failed to init bare repository at {}: {e}",
            remote_path.display()
        )
    });
    repo.remote(
        "origin",
        remote_path
            .to_str()
            .unwrap_or_else(|| panic!("bare_origin: remote path is not valid UTF-8")),
    )
    .unwrap_or_else(|e| panic!("bare_origin: failed to add origin remote: {e}"));
}
