//! Value types shared by the classifier, the action catalog and the report.

use serde::{Deserialize, Serialize};

/// Relationship of the current branch to the base branch's upstream tip.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CommitRelation {
    Same,
    Ahead,
    Behind,
    Diverged,
    /// The branch tip is reachable from the base tip (already merged).
    Ancestor,
}

impl CommitRelation {
    /// Derive the relation from `(ahead, behind)` commit counts.
    ///
    /// A branch that is only behind is an ancestor of the base; the base
    /// branch itself is just behind its upstream.
    pub fn from_counts(ahead: usize, behind: usize, is_base_branch: bool) -> Self {
        match (ahead, behind) {
            (0, 0) => Self::Same,
            (_, 0) => Self::Ahead,
            (0, _) if is_base_branch => Self::Behind,
            (0, _) => Self::Ancestor,
            _ => Self::Diverged,
        }
    }
}

/// Kind of worktree the snapshot was taken in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::IntoStaticStr,
    strum::VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WorktreeType {
    MainWorktree,
    PrWorktree,
    Other,
}

/// Immutable snapshot of the git state a single analysis runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitState {
    /// `None` only for detached HEAD.
    pub current_branch: Option<String>,
    pub base_branch: String,
    pub is_base_branch: bool,
    pub commit_relation: CommitRelation,
    pub staged_files: Vec<String>,
    pub unstaged_files: Vec<String>,
    /// Subjects of commits on HEAD that are not on the base's upstream.
    pub local_commits: Vec<String>,
    pub worktree_type: WorktreeType,
}

impl GitState {
    pub fn has_staged_changes(&self) -> bool {
        !self.staged_files.is_empty()
    }

    pub fn has_unstaged_changes(&self) -> bool {
        !self.unstaged_files.is_empty()
    }

    pub fn has_changes(&self) -> bool {
        self.has_staged_changes() || self.has_unstaged_changes()
    }

    pub fn has_local_commits(&self) -> bool {
        !self.local_commits.is_empty()
    }
}

/// Classification of a [`GitState`]; exactly one applies to every snapshot.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Scenario {
    MainCleanSame,
    MainStagedSame,
    MainUnstagedSame,
    MainBothSame,
    MainCleanAhead,
    MainChangesAhead,
    BranchSameAsMain,
    BranchAncestor,
    BranchDivergent,
    BranchWithChanges,
    DetachedHead,
    PrWorktree,
}

impl Scenario {
    /// One-line human description of the state.
    pub fn description(self) -> &'static str {
        match self {
            Self::MainCleanSame => "On the base branch, up to date, no local changes",
            Self::MainStagedSame => "On the base branch, up to date, with staged changes",
            Self::MainUnstagedSame => "On the base branch, up to date, with unstaged changes",
            Self::MainBothSame => {
                "On the base branch, up to date, with staged and unstaged changes"
            }
            Self::MainCleanAhead => "On the base branch with unpushed local commits",
            Self::MainChangesAhead => {
                "On the base branch with unpushed local commits and uncommitted changes"
            }
            Self::BranchSameAsMain => "On a branch that points at the same commit as the base",
            Self::BranchAncestor => "On a branch that is already merged into the base",
            Self::BranchDivergent => "On a branch with commits not yet in the base",
            Self::BranchWithChanges => "On a branch with uncommitted changes",
            Self::DetachedHead => "Detached HEAD (not on any branch)",
            Self::PrWorktree => "Inside an existing PR worktree",
        }
    }
}

/// Where a newly created branch is rooted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BranchFrom {
    /// The base branch's upstream tip: start fresh.
    OriginMain,
    /// The current HEAD: keep existing commits and work.
    Head,
}

/// Action keys.
///
/// These strings are a stable contract for scripts calling
/// `wtpr create --action <key>`; add new keys rather than repurposing old ones.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionType {
    EmptyCommit,
    CommitStaged,
    CommitAll,
    StashAndEmpty,
    UseCommits,
    PushThenBranch,
    UseCommitsAndCommitAll,
    UseCommitsAndStash,
    CreatePrForBranch,
    PrForBranchCommitAll,
    PrForBranchStash,
    BranchFromDetached,
}

impl ActionType {
    /// Whether executing the action creates a new branch (and so needs a name).
    pub fn creates_branch(self) -> bool {
        !matches!(
            self,
            Self::CreatePrForBranch | Self::PrForBranchCommitAll | Self::PrForBranchStash
        )
    }
}

/// One concrete recipe for resolving a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateAction {
    pub action: ActionType,
    pub branch_from: BranchFrom,
    pub stash_unstaged: bool,
}

impl StateAction {
    pub const fn new(action: ActionType, branch_from: BranchFrom) -> Self {
        Self {
            action,
            branch_from,
            stash_unstaged: false,
        }
    }

    pub const fn stashing_unstaged(mut self) -> Self {
        self.stash_unstaged = true;
        self
    }
}
