//! Repository - a handle for running git commands in one working directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::parse::{parse_local_default_branch, parse_remote_default_branch};
use super::{GitError, StatusEntry};

mod working_tree;
mod worktrees;

/// Short display name for a path, used as logging context.
pub fn path_to_logging_context(path: &Path) -> String {
    if path.to_str() == Some(".") {
        ".".to_string()
    } else {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(".")
            .to_string()
    }
}

/// Repository context for git operations.
///
/// Every command runs with the handle's path as its working directory, so a
/// `Repository` pointed at a linked worktree sees that worktree's branch and
/// status.
///
/// ```no_run
/// use wtpr::git::Repository;
///
/// let repo = Repository::current();
/// let branch = repo.current_branch()?;
/// let dirty = repo.is_dirty()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn current() -> Self {
        Self::at(".")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A handle for another worktree of the same repository.
    pub fn worktree_at(&self, path: impl Into<PathBuf>) -> Self {
        Self::at(path)
    }

    /// Fail with [`GitError::NotARepository`] unless the path is inside a git work tree.
    pub fn ensure_repository(&self) -> anyhow::Result<()> {
        let output = self.git_output(&["rev-parse", "--is-inside-work-tree"])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(GitError::NotARepository {
                path: self.path.clone(),
                error: stderr,
            }
            .into());
        }
        Ok(())
    }

    /// Get the current branch name, or None if in detached HEAD state.
    pub fn current_branch(&self) -> anyhow::Result<Option<String>> {
        let stdout = self.run_command(&["branch", "--show-current"])?;
        let branch = stdout.trim();
        Ok((!branch.is_empty()).then(|| branch.to_string()))
    }

    /// Get the primary remote name for this repository.
    ///
    /// 1. The current branch's upstream remote, when it has one
    /// 2. Otherwise the first entry of `git remote`
    /// 3. `None` when the repository has no remotes
    pub fn primary_remote(&self) -> anyhow::Result<Option<String>> {
        if let Some(branch) = self.current_branch()?
            && let Some(upstream) = self.upstream_branch(&branch)?
            && let Some((remote, _)) = upstream.split_once('/')
        {
            return Ok(Some(remote.to_string()));
        }

        let output = self.run_command(&["remote"])?;
        Ok(output.lines().next().map(str::to_string))
    }

    /// Get the upstream tracking branch for the given branch.
    pub fn upstream_branch(&self, branch: &str) -> anyhow::Result<Option<String>> {
        let result = self.run_command(&["rev-parse", "--abbrev-ref", &format!("{branch}@{{u}}")]);
        Ok(result.ok().and_then(|upstream| {
            let trimmed = upstream.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }))
    }

    /// Get the default branch name for the repository.
    ///
    /// Tries the local `<remote>/HEAD` cache first, then asks the remote.
    /// Returns `None` when there is no remote to ask.
    pub fn default_branch(&self) -> anyhow::Result<Option<String>> {
        let Some(remote) = self.primary_remote()? else {
            return Ok(None);
        };
        if let Ok(stdout) =
            self.run_command(&["rev-parse", "--abbrev-ref", &format!("{remote}/HEAD")])
            && let Ok(branch) = parse_local_default_branch(&stdout, &remote)
        {
            return Ok(Some(branch));
        }
        match self.run_command(&["ls-remote", "--symref", &remote, "HEAD"]) {
            Ok(stdout) => Ok(Some(parse_remote_default_branch(&stdout)?)),
            Err(e) => {
                log::debug!("Could not query default branch from {remote}: {e}");
                Ok(None)
            }
        }
    }

    /// The ref new work is compared against: `<remote>/<base>` when it exists, else `<base>`.
    pub fn base_tip(&self, base: &str) -> anyhow::Result<String> {
        if let Some(remote) = self.primary_remote()? {
            let remote_ref = format!("{remote}/{base}");
            if self.ref_exists(&format!("refs/remotes/{remote_ref}"))? {
                return Ok(remote_ref);
            }
        }
        Ok(base.to_string())
    }

    pub fn ref_exists(&self, reference: &str) -> anyhow::Result<bool> {
        self.run_command_check(&["rev-parse", "--verify", "--quiet", reference])
    }

    /// Check if a local branch exists.
    pub fn branch_exists(&self, branch: &str) -> anyhow::Result<bool> {
        self.ref_exists(&format!("refs/heads/{branch}"))
    }

    pub fn git_dir(&self) -> anyhow::Result<PathBuf> {
        let stdout = self.run_command(&["rev-parse", "--absolute-git-dir"])?;
        Ok(PathBuf::from(stdout.trim()))
    }

    pub fn git_common_dir(&self) -> anyhow::Result<PathBuf> {
        let stdout = self.run_command(&["rev-parse", "--path-format=absolute", "--git-common-dir"])?;
        Ok(PathBuf::from(stdout.trim()))
    }

    /// Whether this path is a linked worktree (as opposed to the main worktree).
    pub fn is_linked_worktree(&self) -> anyhow::Result<bool> {
        let git_dir = dunce::canonicalize(self.git_dir()?)?;
        let common_dir = dunce::canonicalize(self.git_common_dir()?)?;
        Ok(git_dir != common_dir)
    }

    /// Top-level directory of the worktree this handle points into.
    pub fn worktree_root(&self) -> anyhow::Result<PathBuf> {
        let stdout = self.run_command(&["rev-parse", "--show-toplevel"])?;
        Ok(dunce::canonicalize(stdout.trim()).unwrap_or_else(|_| PathBuf::from(stdout.trim())))
    }

    /// Root of the main worktree, shared by every linked worktree.
    pub fn main_worktree_root(&self) -> anyhow::Result<PathBuf> {
        let list = self.list_worktrees()?;
        list.main()
            .map(|wt| wt.path.clone())
            .ok_or_else(|| GitError::ParseError("git worktree list returned nothing".into()).into())
    }

    /// Name of the repository, taken from the main worktree's directory.
    pub fn repo_name(&self) -> anyhow::Result<String> {
        let root = self.main_worktree_root()?;
        root.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                GitError::ParseError(format!(
                    "Could not determine repository name from {}",
                    root.display()
                ))
                .into()
            })
    }

    /// Count commits as `(ahead, behind)` of `head` relative to `base`.
    pub fn ahead_behind(&self, base: &str, head: &str) -> anyhow::Result<(usize, usize)> {
        let range = format!("{base}...{head}");
        let stdout = self.run_command(&["rev-list", "--left-right", "--count", &range])?;
        let mut counts = stdout.split_whitespace().map(str::parse::<usize>);
        match (counts.next(), counts.next()) {
            (Some(Ok(behind)), Some(Ok(ahead))) => Ok((ahead, behind)),
            _ => Err(GitError::ParseError(format!(
                "Failed to parse rev-list counts: {:?}",
                stdout.trim()
            ))
            .into()),
        }
    }

    /// Commit subjects (first line of the message) for a revision range, newest first.
    pub fn commit_subjects(&self, range: &str) -> anyhow::Result<Vec<String>> {
        let output = self.run_command(&["log", "--format=%s", range])?;
        Ok(output.lines().map(String::from).collect())
    }

    /// Parsed `git status --porcelain` entries.
    pub fn status_entries(&self) -> anyhow::Result<Vec<StatusEntry>> {
        let stdout = self.run_command(&[
            "-c",
            "core.quotePath=false",
            "status",
            "--porcelain=v1",
            "--untracked-files=all",
        ])?;
        Ok(StatusEntry::parse_porcelain(&stdout)?)
    }

    /// Check if the working tree has uncommitted changes.
    pub fn is_dirty(&self) -> anyhow::Result<bool> {
        let stdout = self.run_command(&["status", "--porcelain"])?;
        Ok(!stdout.trim().is_empty())
    }

    /// Run a git command in this repository's context and return stdout.
    ///
    /// A non-zero exit becomes [`GitError::CommandFailed`] carrying git's stderr.
    pub fn run_command(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = self.git_output(args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).replace('\r', "\n");
            for line in stderr.trim().lines() {
                log::debug!("  ! {}", line);
            }
            let stdout = String::from_utf8_lossy(&output.stdout);
            let error = [stderr.trim(), stdout.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                error,
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        for line in stdout.trim().lines() {
            log::debug!("  {}", line);
        }
        Ok(stdout)
    }

    /// Run a git command and return whether it exited successfully.
    ///
    /// For commands that answer with their exit code, like
    /// `git merge-base --is-ancestor` or `git rev-parse --verify`.
    pub fn run_command_check(&self, args: &[&str]) -> anyhow::Result<bool> {
        Ok(self.git_output(args)?.status.success())
    }

    fn git_output(&self, args: &[&str]) -> anyhow::Result<std::process::Output> {
        let context = path_to_logging_context(&self.path);
        crate::shell_exec::run(
            Command::new("git").args(args).current_dir(&self.path),
            Some(&context),
        )
        .map_err(|e| -> anyhow::Error {
            match e.kind() {
                // current_dir() of a missing directory also reports NotFound
                ErrorKind::NotFound if !self.path.exists() => GitError::NotARepository {
                    path: self.path.clone(),
                    error: e.to_string(),
                }
                .into(),
                ErrorKind::NotFound => GitError::GitUnavailable {
                    error: e.to_string(),
                }
                .into(),
                _ => anyhow::Error::from(e)
                    .context(format!("Failed to execute: git {}", args.join(" "))),
            }
        })
    }
}
