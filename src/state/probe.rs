//! Taking [`GitState`] snapshots.

use crate::git::{GitError, Repository};

use super::types::{CommitRelation, GitState, WorktreeType};

/// Source of [`GitState`] snapshots.
///
/// Failures (not a repository, git missing, unknown base branch) are returned
/// as-is so callers can show them; a probe never substitutes a default state.
pub trait GitStateProbe {
    fn probe(&self, base_branch: &str) -> anyhow::Result<GitState>;
}

/// A fixed snapshot probes as itself.
impl GitStateProbe for GitState {
    fn probe(&self, _base_branch: &str) -> anyhow::Result<GitState> {
        Ok(self.clone())
    }
}

impl GitStateProbe for Repository {
    fn probe(&self, base_branch: &str) -> anyhow::Result<GitState> {
        self.ensure_repository()?;

        let current_branch = self.current_branch()?;
        let is_base_branch = current_branch.as_deref() == Some(base_branch);

        let tip = self.base_tip(base_branch)?;
        if !self.ref_exists(&tip)? {
            return Err(GitError::BaseBranchNotFound {
                branch: base_branch.to_string(),
            }
            .into());
        }
        let (ahead, behind) = self.ahead_behind(&tip, "HEAD")?;
        let commit_relation = CommitRelation::from_counts(ahead, behind, is_base_branch);
        let local_commits = if ahead > 0 {
            self.commit_subjects(&format!("{tip}..HEAD"))?
        } else {
            Vec::new()
        };

        let entries = self.status_entries()?;
        let staged_files = entries
            .iter()
            .filter(|e| e.is_staged())
            .map(|e| e.path.clone())
            .collect();
        let unstaged_files = entries
            .iter()
            .filter(|e| e.is_unstaged())
            .map(|e| e.path.clone())
            .collect();

        let worktree_type = worktree_type(
            self.is_linked_worktree()?,
            current_branch.is_some(),
            is_base_branch,
        );

        log::debug!(
            "Probed {}: branch={:?} base={} tip={} ahead={} behind={} worktree={}",
            self.path().display(),
            current_branch,
            base_branch,
            tip,
            ahead,
            behind,
            worktree_type
        );

        Ok(GitState {
            current_branch,
            base_branch: base_branch.to_string(),
            is_base_branch,
            commit_relation,
            staged_files,
            unstaged_files,
            local_commits,
            worktree_type,
        })
    }
}

/// A linked worktree on a branch other than the base is a PR worktree.
fn worktree_type(is_linked: bool, on_branch: bool, is_base_branch: bool) -> WorktreeType {
    match (is_linked, on_branch && !is_base_branch) {
        (false, _) => WorktreeType::MainWorktree,
        (true, true) => WorktreeType::PrWorktree,
        (true, false) => WorktreeType::Other,
    }
}
