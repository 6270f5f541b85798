//! Worktree management operations for Repository.

use std::path::Path;

use super::Repository;
use crate::git::{GitError, Worktree, WorktreeList};

impl Repository {
    /// List all worktrees for this repository; the main worktree comes first.
    pub fn list_worktrees(&self) -> anyhow::Result<WorktreeList> {
        let stdout = self.run_command(&["worktree", "list", "--porcelain"])?;
        let worktrees = Worktree::parse_porcelain_list(&stdout)?;
        Ok(WorktreeList { worktrees })
    }

    /// Create a worktree at `path` on a new branch starting at `start`.
    pub fn add_worktree_new_branch(
        &self,
        path: &Path,
        branch: &str,
        start: &str,
    ) -> anyhow::Result<()> {
        if self.branch_exists(branch)? {
            return Err(GitError::BranchAlreadyExists {
                branch: branch.to_string(),
            }
            .into());
        }
        let path_str = self.checked_new_path(path)?;
        self.run_command(&[
            "worktree",
            "add",
            "--no-track",
            "-b",
            branch,
            "--",
            path_str.as_str(),
            start,
        ])?;
        Ok(())
    }

    /// Create a worktree at `path` checking out the existing `branch`.
    pub fn add_worktree(&self, path: &Path, branch: &str) -> anyhow::Result<()> {
        let path_str = self.checked_new_path(path)?;
        self.run_command(&["worktree", "add", "--", path_str.as_str(), branch])?;
        Ok(())
    }

    /// Remove a worktree at the specified path.
    ///
    /// With `force`, passes `--force` so that dirty or untracked contents are
    /// discarded. The main worktree is refused.
    pub fn remove_worktree(&self, path: &Path, force: bool) -> anyhow::Result<()> {
        if self.main_worktree_root()? == path {
            return Err(GitError::CannotRemoveMainWorktree.into());
        }
        let path_str = path.to_string_lossy();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(path_str.as_ref());
        self.run_command(&args)?;
        Ok(())
    }

    /// Prune worktree entries whose directories no longer exist.
    pub fn prune_worktrees(&self) -> anyhow::Result<()> {
        self.run_command(&["worktree", "prune"])?;
        Ok(())
    }

    fn checked_new_path(&self, path: &Path) -> anyhow::Result<String> {
        if path.exists() {
            return Err(GitError::WorktreePathExists {
                path: path.to_path_buf(),
            }
            .into());
        }
        Ok(path.to_string_lossy().into_owned())
    }
}
