//! Turn a chosen [`StateAction`] into an ordered list of [`Step`]s.
//!
//! Planning is pure: it looks only at the action and the names in
//! [`PlanContext`], so every recipe can be checked without touching git.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::git::GitError;
use crate::state::{ActionType, StateAction};

/// Where a step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// The worktree the command was started in.
    Here,
    /// The worktree created by this plan.
    NewWorktree,
}

/// One git or GitHub operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Set local changes aside. `keep_index` leaves staged changes in place.
    Stash { message: String, keep_index: bool },
    StashPop,
    /// Create a branch at HEAD and check it out, carrying changes along.
    SwitchCreate { branch: String },
    /// Return to the branch the command started on.
    SwitchBack { branch: String },
    /// Create a branch at HEAD without checking it out.
    CreateBranch { branch: String },
    CommitStaged { message: String },
    CommitAll { message: String, location: Location },
    EmptyCommit { message: String, location: Location },
    /// Move the base branch back to its upstream tip, keeping local changes.
    ResetBaseToUpstream { target: String },
    /// Push the base branch before branching from it.
    PushBase { branch: String },
    Push { branch: String, location: Location },
    CreatePr { head: String, base: String, location: Location },
    /// New worktree on a new branch starting at `start`.
    AddWorktreeNewBranch { path: PathBuf, branch: String, start: String },
    /// New worktree on an existing branch.
    AddWorktree { path: PathBuf, branch: String },
}

impl Step {
    /// Whether running this step leaves a new worktree behind.
    pub fn creates_worktree(&self) -> bool {
        matches!(self, Step::AddWorktreeNewBranch { .. } | Step::AddWorktree { .. })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Stash { keep_index, .. } if *keep_index => write!(f, "stash unstaged changes"),
            Step::Stash { .. } => write!(f, "stash changes"),
            Step::StashPop => write!(f, "restore stashed changes"),
            Step::SwitchCreate { branch } => write!(f, "create and switch to {branch}"),
            Step::SwitchBack { branch } => write!(f, "switch back to {branch}"),
            Step::CreateBranch { branch } => write!(f, "create branch {branch}"),
            Step::CommitStaged { .. } => write!(f, "commit staged changes"),
            Step::CommitAll { .. } => write!(f, "commit all changes"),
            Step::EmptyCommit { .. } => write!(f, "create empty commit"),
            Step::ResetBaseToUpstream { target } => write!(f, "reset base branch to {target}"),
            Step::PushBase { branch } => write!(f, "push {branch}"),
            Step::Push { branch, .. } => write!(f, "push {branch}"),
            Step::CreatePr { head, base, .. } => write!(f, "open PR {head} → {base}"),
            Step::AddWorktreeNewBranch { path, .. } | Step::AddWorktree { path, .. } => {
                write!(f, "add worktree at {}", path.display())
            }
        }
    }
}

/// Names a plan is built from.
#[derive(Debug, Clone)]
pub struct PlanContext<'a> {
    /// New branch to create; required by actions that create one.
    pub new_branch: Option<&'a str>,
    /// Branch checked out now; `None` when detached.
    pub current_branch: Option<&'a str>,
    pub base_branch: &'a str,
    /// Upstream tip of the base branch, e.g. `origin/main`.
    pub base_tip: &'a str,
    /// Path for the new worktree.
    pub worktree_path: &'a Path,
    /// Commit message for commits the plan makes.
    pub message: &'a str,
}

impl PlanContext<'_> {
    fn require_new_branch(&self, action: ActionType) -> anyhow::Result<String> {
        self.new_branch
            .filter(|b| !b.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                GitError::BranchNameRequired {
                    action: action.to_string(),
                }
                .into()
            })
    }

    fn require_current_branch(&self, action: ActionType) -> anyhow::Result<String> {
        self.current_branch.map(str::to_string).ok_or_else(|| {
            GitError::DetachedHead {
                action: Some(action.to_string()),
            }
            .into()
        })
    }
}

/// Build the steps that carry out `action`.
pub fn plan(action: StateAction, ctx: &PlanContext<'_>) -> anyhow::Result<Vec<Step>> {
    let kind = action.action;
    let b = StepBuilder {
        ctx,
        branch: if kind.creates_branch() {
            ctx.require_new_branch(kind)?
        } else {
            ctx.require_current_branch(kind)?
        },
        stash_message: format!("wtpr: {kind}"),
    };

    let steps = match kind {
        ActionType::EmptyCommit => b.empty_commit(),
        ActionType::StashAndEmpty => [vec![b.stash(false)], b.empty_commit()].concat(),
        ActionType::PushThenBranch => [
            vec![Step::PushBase {
                branch: ctx.require_current_branch(kind)?,
            }],
            b.empty_commit(),
        ]
        .concat(),
        ActionType::CommitStaged => {
            let mut steps = Vec::new();
            if action.stash_unstaged {
                steps.push(b.stash(true));
            }
            steps.extend([
                b.switch_create(),
                Step::CommitStaged {
                    message: ctx.message.to_string(),
                },
                b.push(),
                b.create_pr(),
                b.switch_back(kind)?,
            ]);
            if action.stash_unstaged {
                steps.push(Step::StashPop);
            }
            steps.push(b.add_worktree());
            steps
        }
        ActionType::CommitAll => vec![
            b.switch_create(),
            b.commit_all(),
            b.push(),
            b.create_pr(),
            b.switch_back(kind)?,
            b.add_worktree(),
        ],
        ActionType::UseCommits => vec![
            b.create_branch(),
            b.reset_base(),
            b.push(),
            b.create_pr(),
            b.add_worktree(),
        ],
        ActionType::UseCommitsAndCommitAll => vec![
            b.switch_create(),
            b.commit_all(),
            b.push(),
            b.create_pr(),
            b.switch_back(kind)?,
            b.reset_base(),
            b.add_worktree(),
        ],
        ActionType::UseCommitsAndStash => vec![
            b.stash(false),
            b.create_branch(),
            b.reset_base(),
            Step::StashPop,
            b.push(),
            b.create_pr(),
            b.add_worktree(),
        ],
        ActionType::BranchFromDetached => vec![b.switch_create(), b.push(), b.create_pr()],
        ActionType::CreatePrForBranch => vec![b.push(), b.create_pr()],
        ActionType::PrForBranchCommitAll => vec![b.commit_all(), b.push(), b.create_pr()],
        ActionType::PrForBranchStash => {
            vec![b.stash(false), b.push(), b.create_pr(), Step::StashPop]
        }
    };

    Ok(steps)
}

/// Shared pieces of the recipes. `branch` is the branch the PR is opened
/// for: the new branch, or the current one for actions that don't create one.
struct StepBuilder<'c, 'a> {
    ctx: &'c PlanContext<'a>,
    branch: String,
    stash_message: String,
}

impl StepBuilder<'_, '_> {
    fn stash(&self, keep_index: bool) -> Step {
        Step::Stash {
            message: self.stash_message.clone(),
            keep_index,
        }
    }

    fn switch_create(&self) -> Step {
        Step::SwitchCreate {
            branch: self.branch.clone(),
        }
    }

    fn switch_back(&self, kind: ActionType) -> anyhow::Result<Step> {
        Ok(Step::SwitchBack {
            branch: self.ctx.require_current_branch(kind)?,
        })
    }

    fn create_branch(&self) -> Step {
        Step::CreateBranch {
            branch: self.branch.clone(),
        }
    }

    fn commit_all(&self) -> Step {
        Step::CommitAll {
            message: self.ctx.message.to_string(),
            location: Location::Here,
        }
    }

    fn reset_base(&self) -> Step {
        Step::ResetBaseToUpstream {
            target: self.ctx.base_tip.to_string(),
        }
    }

    fn push(&self) -> Step {
        Step::Push {
            branch: self.branch.clone(),
            location: Location::Here,
        }
    }

    fn create_pr(&self) -> Step {
        Step::CreatePr {
            head: self.branch.clone(),
            base: self.ctx.base_branch.to_string(),
            location: Location::Here,
        }
    }

    fn add_worktree(&self) -> Step {
        Step::AddWorktree {
            path: self.ctx.worktree_path.to_path_buf(),
            branch: self.branch.clone(),
        }
    }

    /// New worktree from the base tip, with an empty commit, pushed and opened as a PR.
    fn empty_commit(&self) -> Vec<Step> {
        vec![
            Step::AddWorktreeNewBranch {
                path: self.ctx.worktree_path.to_path_buf(),
                branch: self.branch.clone(),
                start: self.ctx.base_tip.to_string(),
            },
            Step::EmptyCommit {
                message: self.ctx.message.to_string(),
                location: Location::NewWorktree,
            },
            Step::Push {
                branch: self.branch.clone(),
                location: Location::NewWorktree,
            },
            Step::CreatePr {
                head: self.branch.clone(),
                base: self.ctx.base_branch.to_string(),
                location: Location::NewWorktree,
            },
        ]
    }
}
