//! End-to-end runs of the `wtpr` binary.

use rstest::rstest;
use serde_json::Value;

use crate::common::{TestRepo, repo, repo_with_remote, run};

#[rstest]
fn test_state_json(repo: TestRepo) {
    let (ok, stdout, stderr) = run(repo.wtpr_command().args(["state", "--format", "json"]));
    assert!(ok, "{stderr}");

    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["scenario"], "main_clean_same");
    assert_eq!(report["currentBranch"], "main");
    assert_eq!(report["baseBranch"], "main");
    assert_eq!(report["worktreeType"], "main_worktree");
    assert_eq!(report["hasChanges"], false);
    assert_eq!(report["recommendedAction"], "empty_commit");
    assert_eq!(report["availableActions"][0]["key"], "empty_commit");
    assert!(report["availableActions"][0].get("recipe").is_none());
}

#[rstest]
fn test_state_text(repo: TestRepo) {
    let (ok, stdout, stderr) = run(repo.wtpr_command().arg("state"));
    assert!(ok, "{stderr}");
    insta::assert_snapshot!(stdout.trim_end(), @r"
    main_clean_same  On the base branch, up to date, no local changes
      Branch main, base main, main_worktree
      0 staged files, 0 unstaged files, 0 local commits

      On main with no changes.

      1. Continue with empty initial commit [empty_commit] (recommended)
    ");
}

#[rstest]
fn test_state_from_other_directory(repo: TestRepo) {
    let parent = repo.root_path().parent().unwrap().to_path_buf();
    let (ok, stdout, stderr) = run(repo
        .wtpr_command()
        .current_dir(&parent)
        .args(["-C", "repo", "state", "--format", "json"]));
    assert!(ok, "{stderr}");
    assert!(stdout.contains("main_clean_same"));
}

#[test]
fn test_state_outside_repository() {
    let repo = TestRepo::new();
    let outside = tempfile::tempdir().unwrap();
    let (ok, _, stderr) = run(repo.wtpr_command().current_dir(outside.path()).arg("state"));
    assert!(!ok);
    assert!(stderr.contains("Not a git repository"), "{stderr}");
}

#[rstest]
fn test_state_unknown_base(repo: TestRepo) {
    let (ok, _, stderr) = run(repo.wtpr_command().args(["state", "--base", "trunk"]));
    assert!(!ok);
    assert!(stderr.contains("Base branch trunk not found"), "{stderr}");
}

#[rstest]
fn test_base_branch_from_config(repo: TestRepo) {
    repo.run_git(&["branch", "develop"]);
    repo.run_git(&["branch", "release"]);
    repo.write_user_config("base-branch = \"develop\"\n");

    let (ok, stdout, stderr) = run(repo.wtpr_command().args(["state", "--format", "json"]));
    assert!(ok, "{stderr}");
    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["baseBranch"], "develop");
    assert_eq!(report["scenario"], "branch_same_as_main");

    // Project config wins over user config, --base over both
    repo.write_project_config("base-branch = \"release\"\n");
    let (_, stdout, _) = run(repo.wtpr_command().args(["state", "--format", "json"]));
    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["baseBranch"], "release");

    let (_, stdout, _) = run(repo
        .wtpr_command()
        .args(["state", "--format", "json", "--base", "main"]));
    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["baseBranch"], "main");
}

#[rstest]
fn test_malformed_config(repo: TestRepo) {
    repo.write_project_config("base-branch = [unclosed\n");
    let (ok, _, stderr) = run(repo.wtpr_command().arg("state"));
    assert!(!ok);
    assert!(stderr.contains("wtpr.toml"), "{stderr}");
}

#[rstest]
fn test_create_dry_run(repo_with_remote: TestRepo) {
    let repo = repo_with_remote;
    let (ok, stdout, stderr) = run(repo.wtpr_command().args([
        "create",
        "feat",
        "--action",
        "empty_commit",
        "--dry-run",
    ]));
    assert!(ok, "{stderr}");

    let worktree = repo.sibling_path("repo.feat");
    let stdout = stdout.replace(&worktree.display().to_string(), "[WORKTREE]");
    insta::assert_snapshot!(stdout.trim_end(), @r"
    1. add worktree at [WORKTREE]
    2. create empty commit
    3. push feat
    4. open PR feat → main
    ");
    assert!(!worktree.exists());
    assert!(!repo.repository().branch_exists("feat").unwrap());
}

#[rstest]
fn test_create_needs_branch_name(repo_with_remote: TestRepo) {
    let (ok, _, stderr) = run(repo_with_remote
        .wtpr_command()
        .args(["create", "--yes", "--dry-run"]));
    assert!(!ok);
    assert!(stderr.contains("creates a new branch"), "{stderr}");
}

#[rstest]
fn test_create_without_terminal(repo: TestRepo) {
    let (ok, _, stderr) = run(repo.wtpr_command().args(["create", "feat"]));
    assert!(!ok);
    assert!(stderr.contains("No action chosen"), "{stderr}");
    assert!(stderr.contains("empty_commit"), "{stderr}");
}

#[rstest]
fn test_create_unavailable_action(repo: TestRepo) {
    let (ok, _, stderr) = run(repo
        .wtpr_command()
        .args(["create", "feat", "--action", "use_commits"]));
    assert!(!ok);
    assert!(stderr.contains("Available actions: empty_commit"), "{stderr}");
}

#[rstest]
fn test_create_refused_in_pr_worktree(repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    let (ok, _, stderr) = run(repo
        .wtpr_command()
        .current_dir(&feature)
        .args(["create", "other", "--yes"]));
    assert!(!ok);
    assert!(stderr.contains("Run from the main worktree"), "{stderr}");
}

#[rstest]
fn test_list_json(repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    let (ok, stdout, stderr) = run(repo
        .wtpr_command()
        .args(["list", "--format", "json", "--no-pr"]));
    assert!(ok, "{stderr}");

    let entries: Value = serde_json::from_str(&stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["is_main"], true);
    assert_eq!(entries[0]["branch"], "main");
    assert_eq!(entries[1]["is_main"], false);
    assert_eq!(entries[1]["branch"], "feature");
    assert_eq!(entries[1]["path"], feature.display().to_string());
    assert!(entries[1]["pr"].is_null());
}

#[rstest]
fn test_link_without_config(repo: TestRepo) {
    repo.add_worktree("feature");
    let (ok, _, stderr) = run(repo.wtpr_command().arg("link"));
    assert!(ok, "{stderr}");
    assert!(stderr.contains("No files configured to link"), "{stderr}");
}

#[rstest]
#[cfg(unix)]
fn test_link_symlinks_and_copies(repo: TestRepo) {
    repo.write_project_config("link = [\".env\"]\n");
    repo.write_file(".env", "KEY=1");
    let first = repo.add_worktree("first");
    let second = repo.add_worktree("second");

    let (ok, _, stderr) = run(repo.wtpr_command().args(["link", "first"]));
    assert!(ok, "{stderr}");
    let linked = first.join(".env");
    assert!(std::fs::symlink_metadata(&linked).unwrap().file_type().is_symlink());
    assert!(!second.join(".env").exists());

    let (ok, _, stderr) = run(repo.wtpr_command().args(["link", "--copy"]));
    assert!(ok, "{stderr}");
    let copied = second.join(".env");
    assert!(std::fs::symlink_metadata(&copied).unwrap().file_type().is_file());
    assert_eq!(std::fs::read_to_string(copied).unwrap(), "KEY=1");
    assert!(stderr.contains("already exists"), "{stderr}");
}
