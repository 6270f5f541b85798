//! Probing real repositories and classifying them.

use rstest::rstest;
use wtpr::git::{GitError, Repository};
use wtpr::state::{
    ActionType, AnalyzeOptions, CommitRelation, GitStateProbe, Scenario, StateAnalysisReport,
    WorktreeType, analyze,
};

use crate::common::{TestRepo, canonicalize, repo, repo_with_remote};

fn analyze_main(repo: &Repository) -> StateAnalysisReport {
    analyze(
        repo,
        &AnalyzeOptions {
            base_branch: "main".into(),
            verbose: false,
        },
    )
    .unwrap()
}

#[rstest]
fn test_clean_main(repo: TestRepo) {
    let report = analyze_main(&repo.repository());
    assert_eq!(report.scenario, Scenario::MainCleanSame);
    assert_eq!(report.worktree_type, WorktreeType::MainWorktree);
    assert_eq!(report.action_keys(), vec!["empty_commit"]);
    assert_eq!(report.recommended_action, Some(ActionType::EmptyCommit));
}

#[rstest]
fn test_staged_and_unstaged(repo: TestRepo) {
    repo.stage_file("staged.txt", "s");
    let state = repo.repository().probe("main").unwrap();
    assert_eq!(state.staged_files, vec!["staged.txt"]);
    assert!(state.unstaged_files.is_empty());

    repo.write_file("untracked.txt", "u");
    std::fs::write(repo.root_path().join("file.txt"), "edited").unwrap();
    let report = analyze_main(&repo.repository());
    assert_eq!(report.scenario, Scenario::MainBothSame);
    assert_eq!(report.unstaged_files, vec!["file.txt", "untracked.txt"]);
    assert_eq!(report.recommended_action, Some(ActionType::CommitStaged));
    assert_eq!(report.sub_message.as_deref(), Some("1 file staged, 2 files unstaged"));
}

#[rstest]
fn test_file_both_staged_and_modified(repo: TestRepo) {
    repo.stage_file("file.txt", "staged");
    repo.write_file("file.txt", "then modified");
    let state = repo.repository().probe("main").unwrap();
    assert_eq!(state.staged_files, vec!["file.txt"]);
    assert_eq!(state.unstaged_files, vec!["file.txt"]);
}

#[rstest]
fn test_main_ahead_of_upstream(repo_with_remote: TestRepo) {
    let repo = repo_with_remote;
    repo.commit("Local work");
    repo.commit("More local work");

    let report = analyze_main(&repo.repository());
    assert_eq!(report.scenario, Scenario::MainCleanAhead);
    assert_eq!(report.local_commits, vec!["More local work", "Local work"]);
    assert_eq!(report.recommended_action, Some(ActionType::UseCommits));

    repo.write_file("scratch.txt", "x");
    let report = analyze_main(&repo.repository());
    assert_eq!(report.scenario, Scenario::MainChangesAhead);
    assert_eq!(
        report.action_keys(),
        vec!["use_commits_and_commit_all", "use_commits_and_stash", "empty_commit"]
    );
}

#[rstest]
fn test_feature_branch_relations(repo: TestRepo) {
    repo.run_git(&["switch", "-q", "-c", "feature"]);
    let state = repo.repository().probe("main").unwrap();
    assert_eq!(state.commit_relation, CommitRelation::Same);
    assert_eq!(analyze_main(&repo.repository()).scenario, Scenario::BranchSameAsMain);

    repo.commit("Feature work");
    let report = analyze_main(&repo.repository());
    assert_eq!(report.scenario, Scenario::BranchDivergent);
    assert_eq!(report.local_commits, vec!["Feature work"]);
    assert_eq!(report.recommended_action, Some(ActionType::CreatePrForBranch));

    repo.write_file("wip.txt", "wip");
    let report = analyze_main(&repo.repository());
    assert_eq!(report.scenario, Scenario::BranchWithChanges);
    assert_eq!(report.recommended_action, Some(ActionType::PrForBranchCommitAll));
}

#[rstest]
fn test_merged_branch_is_ancestor(repo: TestRepo) {
    repo.run_git(&["branch", "old"]);
    repo.commit("Main moved on");
    repo.run_git(&["switch", "-q", "old"]);
    let state = repo.repository().probe("main").unwrap();
    assert_eq!(state.commit_relation, CommitRelation::Ancestor);
    assert_eq!(analyze_main(&repo.repository()).scenario, Scenario::BranchAncestor);
}

#[rstest]
fn test_detached_head(repo: TestRepo) {
    let sha = repo.head_sha();
    repo.run_git(&["checkout", "-q", "--detach", &sha]);
    let report = analyze_main(&repo.repository());
    assert_eq!(report.scenario, Scenario::DetachedHead);
    assert_eq!(report.current_branch, None);
    assert_eq!(report.action_keys(), vec!["branch_from_detached", "empty_commit"]);
}

#[rstest]
fn test_linked_worktree_is_pr_worktree(repo: TestRepo) {
    let path = repo.add_worktree("feature");
    let report = analyze_main(&Repository::at(&path));
    assert_eq!(report.scenario, Scenario::PrWorktree);
    assert_eq!(report.worktree_type, WorktreeType::PrWorktree);
    assert!(report.available_actions.is_empty());
    assert_eq!(report.recommended_action, None);
}

#[test]
fn test_not_a_repository() {
    let dir = tempfile::tempdir().unwrap();
    let err = Repository::at(canonicalize(dir.path()))
        .probe("main")
        .unwrap_err();
    let Some(GitError::NotARepository { error, .. }) = err.downcast_ref() else {
        panic!("unexpected error: {err:?}");
    };
    assert!(!error.trim().is_empty());
}

#[rstest]
fn test_missing_base_branch(repo: TestRepo) {
    let err = repo.repository().probe("trunk").unwrap_err();
    assert!(matches!(
        err.downcast_ref(),
        Some(GitError::BaseBranchNotFound { branch }) if branch == "trunk"
    ));
}

#[rstest]
fn test_default_branch_from_remote(repo_with_remote: TestRepo) {
    let repository = repo_with_remote.repository();
    assert_eq!(repository.default_branch().unwrap().as_deref(), Some("main"));
    assert_eq!(repository.base_tip("main").unwrap(), "origin/main");
}
