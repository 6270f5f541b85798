//! Candidate actions for each [`Scenario`].
//!
//! Every table ends with a cancel choice (`action: None`). `branch_from: Head`
//! marks actions that keep existing commits or work by branching from the
//! current position; `OriginMain` starts fresh from the base's upstream.

use serde::Serialize;

use super::types::{ActionType, BranchFrom, GitState, Scenario, StateAction};
use crate::styling::plural;

pub const CANCEL_LABEL: &str = "Cancel";

/// One entry in a scenario's choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioChoice {
    pub label: String,
    /// `None` means cancel, do nothing.
    pub action: Option<StateAction>,
}

impl ScenarioChoice {
    fn action(label: impl Into<String>, action: StateAction) -> Self {
        Self {
            label: label.into(),
            action: Some(action),
        }
    }

    fn cancel() -> Self {
        Self {
            label: CANCEL_LABEL.to_string(),
            action: None,
        }
    }

    pub fn is_cancel(&self) -> bool {
        self.action.is_none()
    }
}

/// Prompt text plus the ordered choices for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceSet {
    pub message: String,
    pub sub_message: Option<String>,
    pub choices: Vec<ScenarioChoice>,
}

impl ChoiceSet {
    /// The non-cancel choices, in catalog order.
    pub fn actions(&self) -> impl Iterator<Item = (&str, StateAction)> {
        self.choices
            .iter()
            .filter_map(|c| c.action.map(|a| (c.label.as_str(), a)))
    }
}

/// What the catalog has to offer for a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioContext {
    Choices(ChoiceSet),
    /// The scenario needs a worktree-aware analysis this catalog does not perform.
    Delegate,
}

const EMPTY_COMMIT_LABEL: &str = "Continue with empty initial commit";

fn empty_commit() -> ScenarioChoice {
    ScenarioChoice::action(
        EMPTY_COMMIT_LABEL,
        StateAction::new(ActionType::EmptyCommit, BranchFrom::OriginMain),
    )
}

fn stash_and_empty() -> ScenarioChoice {
    ScenarioChoice::action(
        "Stash changes and continue with empty initial commit",
        StateAction::new(ActionType::StashAndEmpty, BranchFrom::OriginMain),
    )
}

fn commit_all() -> ScenarioChoice {
    ScenarioChoice::action(
        "Create branch and commit all changes",
        StateAction::new(ActionType::CommitAll, BranchFrom::Head),
    )
}

/// Summarize staged/unstaged counts, e.g. "2 staged files, 1 unstaged file".
fn changes_summary(state: &GitState) -> Option<String> {
    let mut parts = Vec::new();
    if state.has_staged_changes() {
        parts.push(format!("{} staged", plural(state.staged_files.len(), "file")));
    }
    if state.has_unstaged_changes() {
        parts.push(format!(
            "{} unstaged",
            plural(state.unstaged_files.len(), "file")
        ));
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Look up the choices for `scenario`, interpolating names and counts from `state`.
pub fn get_choices(scenario: Scenario, state: &GitState) -> ScenarioContext {
    let base = state.base_branch.as_str();
    let branch = state.current_branch.as_deref().unwrap_or("HEAD");
    let commits = plural(state.local_commits.len(), "local commit");

    let (message, sub_message, choices) = match scenario {
        Scenario::PrWorktree => return ScenarioContext::Delegate,

        Scenario::MainCleanSame => (
            format!("On {base} with no changes."),
            None,
            vec![empty_commit(), ScenarioChoice::cancel()],
        ),

        Scenario::MainStagedSame => (
            format!("You have staged changes on {base}."),
            changes_summary(state),
            vec![
                ScenarioChoice::action(
                    "Create branch and commit staged changes",
                    StateAction::new(ActionType::CommitStaged, BranchFrom::Head),
                ),
                empty_commit(),
                ScenarioChoice::cancel(),
            ],
        ),

        Scenario::MainUnstagedSame => (
            format!("You have uncommitted changes on {base}."),
            changes_summary(state),
            vec![
                commit_all(),
                empty_commit(),
                stash_and_empty(),
                ScenarioChoice::cancel(),
            ],
        ),

        Scenario::MainBothSame => (
            format!("You have staged and unstaged changes on {base}."),
            changes_summary(state),
            vec![
                ScenarioChoice::action(
                    "Commit staged changes to a new branch (stash unstaged)",
                    StateAction::new(ActionType::CommitStaged, BranchFrom::Head)
                        .stashing_unstaged(),
                ),
                commit_all(),
                empty_commit(),
                stash_and_empty(),
                ScenarioChoice::cancel(),
            ],
        ),

        Scenario::MainCleanAhead => (
            format!("{base} has {commits} not on its upstream."),
            None,
            vec![
                ScenarioChoice::action(
                    format!("Move {commits} to a new branch"),
                    StateAction::new(ActionType::UseCommits, BranchFrom::Head),
                ),
                ScenarioChoice::action(
                    format!("Push {commits} to {base}, then start fresh"),
                    StateAction::new(ActionType::PushThenBranch, BranchFrom::OriginMain),
                ),
                empty_commit(),
                ScenarioChoice::cancel(),
            ],
        ),

        Scenario::MainChangesAhead => (
            format!("{base} has {commits} and uncommitted changes."),
            changes_summary(state),
            vec![
                ScenarioChoice::action(
                    format!("Move {commits} to a new branch and commit all changes"),
                    StateAction::new(ActionType::UseCommitsAndCommitAll, BranchFrom::Head),
                ),
                ScenarioChoice::action(
                    format!("Move {commits} to a new branch (stash changes)"),
                    StateAction::new(ActionType::UseCommitsAndStash, BranchFrom::Head),
                ),
                empty_commit(),
                ScenarioChoice::cancel(),
            ],
        ),

        Scenario::BranchSameAsMain => (
            format!("{branch} points at the same commit as {base}."),
            None,
            vec![empty_commit(), ScenarioChoice::cancel()],
        ),

        Scenario::BranchAncestor => (
            format!("{branch} is already merged into {base}."),
            None,
            vec![empty_commit(), ScenarioChoice::cancel()],
        ),

        Scenario::BranchDivergent => (
            format!("{branch} has {commits} not in {base}."),
            None,
            vec![
                ScenarioChoice::action(
                    format!("Create PR for {branch}"),
                    StateAction::new(ActionType::CreatePrForBranch, BranchFrom::Head),
                ),
                empty_commit(),
                ScenarioChoice::cancel(),
            ],
        ),

        Scenario::BranchWithChanges if state.has_local_commits() => (
            format!("{branch} has {commits} and uncommitted changes."),
            changes_summary(state),
            vec![
                ScenarioChoice::action(
                    format!("Commit all changes and create PR for {branch}"),
                    StateAction::new(ActionType::PrForBranchCommitAll, BranchFrom::Head),
                ),
                ScenarioChoice::action(
                    format!("Stash changes and create PR for {branch}"),
                    StateAction::new(ActionType::PrForBranchStash, BranchFrom::Head),
                ),
                empty_commit(),
                ScenarioChoice::cancel(),
            ],
        ),

        Scenario::BranchWithChanges => (
            format!("{branch} has uncommitted changes and no commits of its own."),
            changes_summary(state),
            vec![
                commit_all(),
                empty_commit(),
                stash_and_empty(),
                ScenarioChoice::cancel(),
            ],
        ),

        Scenario::DetachedHead => (
            "HEAD is detached.".to_string(),
            None,
            vec![
                ScenarioChoice::action(
                    "Create branch from current commit",
                    StateAction::new(ActionType::BranchFromDetached, BranchFrom::Head),
                ),
                empty_commit(),
                ScenarioChoice::cancel(),
            ],
        ),
    };

    ScenarioContext::Choices(ChoiceSet {
        message,
        sub_message,
        choices,
    })
}
