//! Worktree listing, removal and file linking against real repositories.

use rstest::rstest;
use wtpr::config::Config;
use wtpr::git::{GitError, Repository};
use wtpr::link::{LinkMode, LinkOutcome, link_entries};

use crate::common::{TestRepo, repo};

#[rstest]
fn test_list_worktrees(repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    let list = repo.repository().list_worktrees().unwrap();

    let main = list.main().unwrap();
    assert_eq!(main.path, repo.root_path());
    assert_eq!(main.branch.as_deref(), Some("main"));

    let linked: Vec<_> = list.linked().collect();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].path, feature);
    assert_eq!(linked[0].branch.as_deref(), Some("feature"));
    assert!(!linked[0].detached);

    // Same list from inside the linked worktree
    let from_linked = Repository::at(&feature);
    assert_eq!(from_linked.main_worktree_root().unwrap(), repo.root_path());
    assert_eq!(from_linked.worktree_root().unwrap(), feature);
    assert_eq!(from_linked.repo_name().unwrap(), "repo");
    assert!(from_linked.is_linked_worktree().unwrap());
    assert!(!repo.repository().is_linked_worktree().unwrap());
}

#[rstest]
fn test_remove_worktree_and_branch(repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    let repository = repo.repository();

    repository.remove_worktree(&feature, false).unwrap();
    repository.delete_branch("feature", true).unwrap();
    repository.prune_worktrees().unwrap();

    assert!(!feature.exists());
    assert!(!repository.branch_exists("feature").unwrap());
    assert_eq!(repository.list_worktrees().unwrap().worktrees.len(), 1);
}

#[rstest]
fn test_dirty_worktree_needs_force(repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    std::fs::write(feature.join("file.txt"), "edited").unwrap();
    let repository = repo.repository();

    assert!(repository.worktree_at(&feature).is_dirty().unwrap());
    assert!(repository.remove_worktree(&feature, false).is_err());
    repository.remove_worktree(&feature, true).unwrap();
    assert!(!feature.exists());
}

#[rstest]
fn test_main_worktree_is_never_removed(repo: TestRepo) {
    let err = repo
        .repository()
        .remove_worktree(repo.root_path(), true)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref(),
        Some(GitError::CannotRemoveMainWorktree)
    ));
    assert!(repo.root_path().join(".git").exists());
}

#[rstest]
fn test_deleted_directory_is_prunable(repo: TestRepo) {
    let feature = repo.add_worktree("feature");
    std::fs::remove_dir_all(&feature).unwrap();

    let list = repo.repository().list_worktrees().unwrap();
    assert!(list.linked().next().unwrap().prunable.is_some());

    repo.repository().prune_worktrees().unwrap();
    assert_eq!(repo.repository().list_worktrees().unwrap().worktrees.len(), 1);
}

#[rstest]
fn test_default_worktree_path_is_sibling(repo: TestRepo) {
    let path = Config::default()
        .worktree_path_for(repo.root_path(), "repo", "feat/login")
        .unwrap();
    assert_eq!(path, repo.sibling_path("repo.feat-login"));
}

#[rstest]
fn test_link_into_worktree(repo: TestRepo) {
    repo.write_file(".env", "SECRET=1");
    repo.write_file("local/settings.json", "{}");
    let feature = repo.add_worktree("feature");
    let entries = vec![".env".to_string(), "local".to_string(), "missing".to_string()];

    let results =
        link_entries(repo.root_path(), &feature, &entries, LinkMode::Copy, false).unwrap();
    let outcomes: Vec<_> = results.iter().map(|r| r.outcome.clone()).collect();
    assert_eq!(
        outcomes,
        vec![LinkOutcome::Copied, LinkOutcome::Copied, LinkOutcome::MissingSource]
    );
    assert_eq!(
        std::fs::read_to_string(feature.join(".env")).unwrap(),
        "SECRET=1"
    );
    assert!(feature.join("local/settings.json").is_file());

    // Second run leaves existing files alone
    let again = link_entries(repo.root_path(), &feature, &entries[..1], LinkMode::Copy, false)
        .unwrap();
    assert_eq!(again[0].outcome, LinkOutcome::Exists);
}
