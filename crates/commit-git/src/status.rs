//! Structured working-tree status summary.

use serde::Serialize;

/// Snapshot of the working tree and index, grouped by change kind.
///
/// Paths appear in at most the categories that apply to them; a path that is
/// both staged and further modified shows up in `staged` and `modified`.
#[derive(Debug, Default, Serialize)]
pub struct StatusSummary {
    /// Current branch name, `None` when HEAD is detached or unborn
    pub current: Option<String>,

    /// Paths with changes staged in the index
    pub staged: Vec<String>,

    /// Tracked paths modified in the working tree but not staged
    pub modified: Vec<String>,

    /// Tracked paths deleted from the working tree but not staged
    pub deleted: Vec<String>,

    /// Paths renamed in the index
    pub renamed: Vec<String>,

    /// Untracked paths
    pub not_added: Vec<String>,

    /// Paths with merge conflicts
    pub conflicted: Vec<String>,

    /// True when every category above is empty
    pub is_clean: bool,
}

impl StatusSummary {
    /// Recomputes the `is_clean` flag from the category lists.
    pub(crate) fn finalize(mut self) -> Self {
        self.is_clean = self.staged.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
            && self.not_added.is_empty()
            && self.conflicted.is_empty();
        self
    }
}
