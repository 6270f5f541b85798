#![allow(dead_code)]

//! # Test utilities for wtpr
//!
//! `TestRepo` creates an isolated git repository in a temporary directory, on
//! `main` with one initial commit. Identity and signing settings live in the
//! repository's local config, so library calls (which inherit the test
//! process's environment) and CLI runs (which get an isolated environment)
//! behave the same.
//!
//! Paths are canonicalized so comparisons work where the temp dir is behind a
//! symlink (macOS `/var` -> `/private/var`).

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use wtpr::git::Repository;

#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// Canonicalize a path without the Windows verbatim prefix (`\\?\`).
pub fn canonicalize(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap()
}

/// Isolate a git command from the host's global and system config.
pub fn configure_git_cmd(cmd: &mut Command, git_config_path: &Path) {
    cmd.env("GIT_CONFIG_GLOBAL", git_config_path);
    cmd.env("GIT_CONFIG_SYSTEM", NULL_DEVICE);
    cmd.env("GIT_AUTHOR_DATE", "2025-01-01T00:00:00Z");
    cmd.env("GIT_COMMITTER_DATE", "2025-01-01T00:00:00Z");
    cmd.env("LC_ALL", "C");
    cmd.env("LANG", "C");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
}

pub fn check_git_status(output: &Output, cmd_desc: &str) {
    if !output.status.success() {
        panic!(
            "git {cmd_desc} failed:\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

pub struct TestRepo {
    temp_dir: TempDir, // Must keep to ensure cleanup on drop
    root: PathBuf,
    remote: Option<PathBuf>,
    /// wtpr user config for CLI runs (absent unless a test writes it)
    test_config_path: PathBuf,
    git_config_path: PathBuf,
}

impl TestRepo {
    /// A repository on `main` with one commit.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("repo");
        std::fs::create_dir(&root).unwrap();
        let root = canonicalize(&root);

        let git_config_path = temp_dir.path().join("test-gitconfig");
        std::fs::write(
            &git_config_path,
            "[user]\n\tname = Test User\n\temail = test@example.com\n\
             [init]\n\tdefaultBranch = main\n",
        )
        .unwrap();

        let repo = Self {
            test_config_path: temp_dir.path().join("test-config.toml"),
            temp_dir,
            root,
            remote: None,
            git_config_path,
        };

        repo.run_git(&["init", "-q", "-b", "main"]);
        for (key, value) in [
            ("user.name", "Test User"),
            ("user.email", "test@example.com"),
            ("commit.gpgsign", "false"),
            ("advice.detachedHead", "false"),
        ] {
            repo.run_git(&["config", key, value]);
        }
        repo.commit("Initial commit");
        repo
    }

    /// Add a bare `origin` remote with `main` pushed and set as its HEAD.
    pub fn with_remote(mut self) -> Self {
        let remote = self.temp_dir.path().join("origin.git");
        let output = self
            .git_command()
            .args(["init", "-q", "--bare", "-b", "main"])
            .arg(&remote)
            .output()
            .unwrap();
        check_git_status(&output, "init --bare");

        let remote_str = remote.to_string_lossy().into_owned();
        self.run_git(&["remote", "add", "origin", &remote_str]);
        self.run_git(&["push", "-q", "-u", "origin", "main"]);
        self.run_git(&["remote", "set-head", "origin", "main"]);
        self.remote = Some(remote);
        self
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    pub fn remote_path(&self) -> Option<&Path> {
        self.remote.as_deref()
    }

    /// Library handle on the main worktree.
    pub fn repository(&self) -> Repository {
        Repository::at(&self.root)
    }

    /// Sibling path where a worktree for `branch` would be created by default.
    pub fn sibling_path(&self, name: &str) -> PathBuf {
        canonicalize(self.temp_dir.path()).join(name)
    }

    #[must_use]
    pub fn git_command(&self) -> Command {
        let mut cmd = Command::new("git");
        configure_git_cmd(&mut cmd, &self.git_config_path);
        cmd.current_dir(&self.root);
        cmd
    }

    pub fn run_git(&self, args: &[&str]) {
        self.run_git_in(&self.root, args);
    }

    pub fn run_git_in(&self, dir: &Path, args: &[&str]) {
        let output = self.git_command().args(args).current_dir(dir).output().unwrap();
        check_git_status(&output, &args.join(" "));
    }

    /// Run a git command and return trimmed stdout.
    pub fn git_output(&self, args: &[&str]) -> String {
        self.git_output_in(&self.root, args)
    }

    pub fn git_output_in(&self, dir: &Path, args: &[&str]) -> String {
        let output = self.git_command().args(args).current_dir(dir).output().unwrap();
        check_git_status(&output, &args.join(" "));
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Overwrite `file.txt` with `message`, stage it and commit.
    pub fn commit(&self, message: &str) {
        self.commit_in(&self.root, message);
    }

    pub fn commit_in(&self, dir: &Path, message: &str) {
        std::fs::write(dir.join("file.txt"), message).unwrap();
        self.run_git_in(dir, &["add", "file.txt"]);
        self.run_git_in(dir, &["commit", "-q", "-m", message]);
    }

    pub fn write_file(&self, name: &str, contents: &str) {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    /// Write `name` and stage it.
    pub fn stage_file(&self, name: &str, contents: &str) {
        self.write_file(name, contents);
        self.run_git(&["add", name]);
    }

    /// Create a linked worktree on a new branch `branch` and return its path.
    pub fn add_worktree(&self, branch: &str) -> PathBuf {
        let path = self.sibling_path(&format!("repo.{branch}"));
        let path_str = path.to_string_lossy().into_owned();
        self.run_git(&["worktree", "add", "-q", "-b", branch, &path_str]);
        canonicalize(&path)
    }

    pub fn head_sha(&self) -> String {
        self.git_output(&["rev-parse", "HEAD"])
    }

    pub fn current_branch_in(&self, dir: &Path) -> String {
        self.git_output_in(dir, &["branch", "--show-current"])
    }

    /// Write the wtpr project config at `.config/wtpr.toml`, excluded from
    /// git status so it doesn't change the analyzed state.
    pub fn write_project_config(&self, contents: &str) {
        self.write_file(".config/wtpr.toml", contents);
        let exclude = self.root.join(".git/info/exclude");
        let mut existing = std::fs::read_to_string(&exclude).unwrap_or_default();
        if !existing.contains(".config/") {
            existing.push_str("\n.config/\n");
            std::fs::create_dir_all(exclude.parent().unwrap()).unwrap();
            std::fs::write(exclude, existing).unwrap();
        }
    }

    pub fn write_user_config(&self, contents: &str) {
        std::fs::write(&self.test_config_path, contents).unwrap();
    }

    /// A `wtpr` command running in the repo with an isolated environment.
    ///
    /// Host `GIT_*` and `WTPR_*` variables are cleared, the user config points
    /// at this test's (possibly absent) config file, and color is off.
    #[must_use]
    pub fn wtpr_command(&self) -> Command {
        let mut cmd = Command::new(insta_cmd::get_cargo_bin("wtpr"));
        for (key, _) in std::env::vars() {
            if key.starts_with("GIT_") || key.starts_with("WTPR_") {
                cmd.env_remove(&key);
            }
        }
        configure_git_cmd(&mut cmd, &self.git_config_path);
        cmd.env("WTPR_CONFIG_PATH", &self.test_config_path);
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("CLICOLOR_FORCE");
        cmd.env("RUST_LOG", "warn");
        cmd.current_dir(&self.root);
        cmd
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// rstest fixture: plain repository.
#[rstest::fixture]
pub fn repo() -> TestRepo {
    TestRepo::new()
}

/// rstest fixture: repository with a bare `origin`.
#[rstest::fixture]
pub fn repo_with_remote() -> TestRepo {
    TestRepo::new().with_remote()
}

/// Run a command and return `(success, stdout, stderr)`.
pub fn run(cmd: &mut Command) -> (bool, String, String) {
    let output = cmd.stdin(std::process::Stdio::null()).output().unwrap();
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}
