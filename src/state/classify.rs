//! Map a [`GitState`] snapshot to exactly one [`Scenario`].
//!
//! Rules are checked in priority order and the first match wins. The rules
//! overlap (a PR worktree can also be detached, a branch equal to the base can
//! also carry changes), so the order is part of the contract.

use super::types::{CommitRelation, GitState, Scenario, WorktreeType};

/// Classify a snapshot. Total and side-effect free: every input maps to a scenario.
pub fn classify(state: &GitState) -> Scenario {
    if state.worktree_type == WorktreeType::PrWorktree {
        return Scenario::PrWorktree;
    }
    if state.current_branch.is_none() {
        return Scenario::DetachedHead;
    }
    if state.is_base_branch {
        classify_base_branch(state)
    } else {
        classify_feature_branch(state)
    }
}

fn classify_base_branch(state: &GitState) -> Scenario {
    let staged = state.has_staged_changes();
    let unstaged = state.has_unstaged_changes();

    match state.commit_relation {
        CommitRelation::Same => match (staged, unstaged) {
            (false, false) => Scenario::MainCleanSame,
            (true, false) => Scenario::MainStagedSame,
            (false, true) => Scenario::MainUnstagedSame,
            (true, true) => Scenario::MainBothSame,
        },
        CommitRelation::Ahead if state.has_changes() => Scenario::MainChangesAhead,
        CommitRelation::Ahead => Scenario::MainCleanAhead,
        // Behind or diverged from upstream: nothing specific to offer
        _ => Scenario::MainCleanSame,
    }
}

fn classify_feature_branch(state: &GitState) -> Scenario {
    match state.commit_relation {
        CommitRelation::Same => Scenario::BranchSameAsMain,
        CommitRelation::Ancestor => Scenario::BranchAncestor,
        _ if state.has_local_commits() && !state.has_changes() => Scenario::BranchDivergent,
        // Changes on any relation, and the degenerate "no commits, no changes" case
        _ => Scenario::BranchWithChanges,
    }
}
