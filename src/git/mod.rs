//! Git operations and repository management

use std::path::PathBuf;

mod error;
mod parse;
mod repository;

pub use error::GitError;
pub use parse::StatusEntry;
pub use repository::{Repository, path_to_logging_context};

/// Worktree information from `git worktree list --porcelain`
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Worktree {
    pub path: PathBuf,
    pub head: String,
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
    pub locked: Option<String>,
    pub prunable: Option<String>,
}

impl Worktree {
    /// First seven characters of the HEAD sha.
    pub fn short_head(&self) -> &str {
        &self.head[..7.min(self.head.len())]
    }
}

/// Result of `git worktree list`, where the first entry is always the main worktree.
#[derive(Debug, Clone)]
pub struct WorktreeList {
    pub worktrees: Vec<Worktree>,
}

impl WorktreeList {
    pub fn main(&self) -> Option<&Worktree> {
        self.worktrees.first()
    }

    /// Linked worktrees (every entry after the main one).
    pub fn linked(&self) -> impl Iterator<Item = &Worktree> {
        self.worktrees.iter().skip(1)
    }

    pub fn for_branch(&self, branch: &str) -> Option<&Worktree> {
        self.worktrees
            .iter()
            .find(|wt| wt.branch.as_deref() == Some(branch))
    }
}
