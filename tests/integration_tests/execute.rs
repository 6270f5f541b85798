//! Running planned actions against real repositories.
//!
//! `CreatePr` needs GitHub, so these tests drop it from the plan and check the
//! git side: branches, commits, pushes, stashes and worktrees.

use std::path::Path;

use rstest::rstest;
use wtpr::execute::{Executor, Outcome, PlanContext, PrOptions, Step, plan};
use wtpr::git::GitError;
use wtpr::state::{ActionType, AnalyzeOptions, analyze};

use crate::common::{TestRepo, repo, repo_with_remote};

const TITLE: &str = "Add feature";

fn run_action(repo: &TestRepo, key: ActionType, branch: &str, worktree: &Path) -> anyhow::Result<Outcome> {
    let repository = repo.repository();
    let report = analyze(
        &repository,
        &AnalyzeOptions {
            base_branch: "main".into(),
            verbose: false,
        },
    )?;
    let action = report
        .action(key)
        .unwrap_or_else(|| panic!("{key} not offered in {}", report.scenario));
    let base_tip = repository.base_tip("main")?;
    let steps: Vec<Step> = plan(
        action.recipe,
        &PlanContext {
            new_branch: Some(branch),
            current_branch: report.current_branch.as_deref(),
            base_branch: "main",
            base_tip: &base_tip,
            worktree_path: worktree,
            message: TITLE,
        },
    )?
    .into_iter()
    .filter(|step| !matches!(step, Step::CreatePr { .. }))
    .collect();

    Executor::new(
        &repository,
        worktree.to_path_buf(),
        PrOptions {
            title: TITLE.into(),
            body: String::new(),
            draft: false,
        },
    )?
    .run(&steps)
}

fn remote_has_branch(repo: &TestRepo, branch: &str) -> bool {
    !repo
        .git_output(&["ls-remote", "--heads", "origin", branch])
        .is_empty()
}

#[rstest]
fn test_empty_commit(repo_with_remote: TestRepo) {
    let repo = repo_with_remote;
    let worktree = repo.sibling_path("repo.feat");

    let outcome = run_action(&repo, ActionType::EmptyCommit, "feat", &worktree).unwrap();

    assert_eq!(outcome.worktree.as_deref(), Some(worktree.as_path()));
    assert_eq!(repo.current_branch_in(&worktree), "feat");
    assert_eq!(repo.git_output_in(&worktree, &["log", "-1", "--format=%s"]), TITLE);
    assert!(remote_has_branch(&repo, "feat"));
    // Main worktree untouched
    assert_eq!(repo.current_branch_in(repo.root_path()), "main");
    assert_eq!(repo.git_output(&["log", "-1", "--format=%s"]), "Initial commit");
}

#[rstest]
fn test_commit_all(repo_with_remote: TestRepo) {
    let repo = repo_with_remote;
    repo.write_file("new.txt", "new work");
    let worktree = repo.sibling_path("repo.feat");

    run_action(&repo, ActionType::CommitAll, "feat", &worktree).unwrap();

    assert_eq!(repo.current_branch_in(repo.root_path()), "main");
    assert_eq!(repo.git_output(&["status", "--porcelain"]), "");
    assert!(!repo.root_path().join("new.txt").exists());
    assert_eq!(
        std::fs::read_to_string(worktree.join("new.txt")).unwrap(),
        "new work"
    );
    assert_eq!(repo.git_output(&["log", "-1", "--format=%s", "feat"]), TITLE);
    assert!(remote_has_branch(&repo, "feat"));
}

#[rstest]
fn test_commit_staged_keeps_unstaged_work(repo_with_remote: TestRepo) {
    let repo = repo_with_remote;
    repo.stage_file("staged.txt", "ready");
    repo.write_file("file.txt", "still editing");
    repo.write_file("notes.txt", "scratch");
    let worktree = repo.sibling_path("repo.feat");

    let outcome = run_action(&repo, ActionType::CommitStaged, "feat", &worktree).unwrap();

    assert!(outcome.completed.contains(&Step::StashPop));
    assert_eq!(repo.current_branch_in(repo.root_path()), "main");
    assert_eq!(
        std::fs::read_to_string(repo.root_path().join("file.txt")).unwrap(),
        "still editing"
    );
    let committed = repo.git_output(&["show", "--name-only", "--format=", "feat"]);
    assert_eq!(committed, "staged.txt");
    assert!(worktree.join("staged.txt").exists());

    // Only the unstaged work comes back to main; the committed file stays on feat
    assert!(!repo.root_path().join("staged.txt").exists());
    assert_eq!(
        repo.git_output(&["status", "--porcelain"]),
        "M file.txt\n?? notes.txt"
    );
    assert_eq!(repo.git_output(&["stash", "list"]), "");
}

#[rstest]
fn test_use_commits_moves_them_off_main(repo_with_remote: TestRepo) {
    let repo = repo_with_remote;
    let upstream = repo.git_output(&["rev-parse", "origin/main"]);
    repo.commit("Local work");
    let local = repo.head_sha();
    let worktree = repo.sibling_path("repo.feat");

    run_action(&repo, ActionType::UseCommits, "feat", &worktree).unwrap();

    assert_eq!(repo.head_sha(), upstream);
    assert_eq!(repo.git_output(&["rev-parse", "feat"]), local);
    assert_eq!(repo.current_branch_in(&worktree), "feat");
    assert!(remote_has_branch(&repo, "feat"));
}

#[rstest]
fn test_pr_for_branch_stash_restores_changes(repo_with_remote: TestRepo) {
    let repo = repo_with_remote;
    repo.run_git(&["switch", "-q", "-c", "topic"]);
    repo.commit("Topic work");
    repo.write_file("wip.txt", "unfinished");
    let worktree = repo.sibling_path("repo.topic");

    let outcome = run_action(&repo, ActionType::PrForBranchStash, "topic", &worktree).unwrap();

    assert_eq!(outcome.worktree, None);
    assert!(remote_has_branch(&repo, "topic"));
    assert_eq!(
        std::fs::read_to_string(repo.root_path().join("wip.txt")).unwrap(),
        "unfinished"
    );
    assert_eq!(repo.git_output(&["stash", "list"]), "");
}

#[rstest]
fn test_existing_branch_stops_before_changing_anything(repo_with_remote: TestRepo) {
    let repo = repo_with_remote;
    repo.run_git(&["branch", "feat"]);
    repo.write_file("new.txt", "work");
    let worktree = repo.sibling_path("repo.feat");

    let err = run_action(&repo, ActionType::CommitAll, "feat", &worktree).unwrap_err();

    assert!(matches!(
        err.downcast_ref(),
        Some(GitError::BranchAlreadyExists { branch }) if branch == "feat"
    ));
    assert_eq!(repo.current_branch_in(repo.root_path()), "main");
    assert!(repo.root_path().join("new.txt").exists());
    assert!(!worktree.exists());
}

#[rstest]
fn test_existing_branch_leaves_no_stash_behind(repo_with_remote: TestRepo) {
    let repo = repo_with_remote;
    repo.run_git(&["branch", "feat"]);
    repo.stage_file("staged.txt", "ready");
    repo.write_file("file.txt", "still editing");
    let worktree = repo.sibling_path("repo.feat");

    let err = run_action(&repo, ActionType::CommitStaged, "feat", &worktree).unwrap_err();

    assert!(matches!(
        err.downcast_ref(),
        Some(GitError::BranchAlreadyExists { .. })
    ));
    assert_eq!(repo.git_output(&["stash", "list"]), "");
    assert_eq!(
        std::fs::read_to_string(repo.root_path().join("file.txt")).unwrap(),
        "still editing"
    );
}

#[rstest]
fn test_failed_git_command_names_the_step(repo_with_remote: TestRepo) {
    let repo = repo_with_remote;
    // Unreachable remote: the push step fails after the worktree exists
    repo.run_git(&["remote", "set-url", "origin", "/nonexistent/remote.git"]);
    let worktree = repo.sibling_path("repo.feat");

    let err = run_action(&repo, ActionType::EmptyCommit, "feat", &worktree).unwrap_err();

    let Some(GitError::StepFailed { step, .. }) = err.downcast_ref() else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(step, "push feat");
    assert!(worktree.exists());
}

#[rstest]
fn test_push_without_remote(repo: TestRepo) {
    let worktree = repo.sibling_path("repo.feat");
    let err = run_action(&repo, ActionType::EmptyCommit, "feat", &worktree).unwrap_err();
    assert!(err.to_string().contains("No git remote"), "{err}");
}
