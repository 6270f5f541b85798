//! Working-tree mutations: stash, branch switching, commits, pushes.

use super::Repository;

impl Repository {
    /// Stash local changes, including untracked files.
    ///
    /// With `keep_index`, staged changes also stay in the index and working
    /// tree. The stash still records them, so restore it with
    /// [`Repository::stash_pop_unstaged`] once the staged work is committed
    /// elsewhere. Returns false when there was nothing to stash.
    pub fn stash_push(&self, message: &str, keep_index: bool) -> anyhow::Result<bool> {
        let before = self.stash_count()?;
        let mut args = vec!["stash", "push", "--include-untracked", "--message", message];
        if keep_index {
            args.push("--keep-index");
        }
        self.run_command(&args)?;
        Ok(self.stash_count()? > before)
    }

    pub fn stash_pop(&self) -> anyhow::Result<()> {
        self.run_command(&["stash", "pop"])?;
        Ok(())
    }

    /// Restore only the unstaged part of the latest stash, then drop it.
    ///
    /// A stash records the index as its second parent and untracked files as
    /// its third. The index-to-worktree changes are replayed onto HEAD, so the
    /// staged work is left out. Everything ends up unstaged. On a conflict the
    /// stash is kept.
    pub fn stash_pop_unstaged(&self) -> anyhow::Result<()> {
        let stash = self.run_command(&["rev-parse", "--verify", "stash@{0}"])?;
        let stash = stash.trim();
        let index = format!("{stash}^2");

        if !self.run_command_check(&["diff", "--quiet", &index, stash])? {
            let tree = format!("{stash}^{{tree}}");
            let replay = self.run_command(&[
                "commit-tree",
                &tree,
                "-p",
                &index,
                "-m",
                "wtpr: unstaged changes",
            ])?;
            self.run_command(&["cherry-pick", "--no-commit", replay.trim()])?;
        }

        let untracked = format!("{stash}^3");
        if self.run_command_check(&["rev-parse", "--verify", "--quiet", &untracked])? {
            self.run_command(&["checkout", &untracked, "--", "."])?;
        }

        self.run_command(&["reset", "--quiet"])?;
        self.run_command(&["stash", "drop", "--quiet", "stash@{0}"])?;
        Ok(())
    }

    fn stash_count(&self) -> anyhow::Result<usize> {
        let stdout = self.run_command(&["stash", "list"])?;
        Ok(stdout.lines().filter(|l| !l.trim().is_empty()).count())
    }

    /// Create `branch` at HEAD and check it out, carrying working-tree changes along.
    pub fn switch_create(&self, branch: &str) -> anyhow::Result<()> {
        self.run_command(&["switch", "-c", branch])?;
        Ok(())
    }

    pub fn switch(&self, branch: &str) -> anyhow::Result<()> {
        self.run_command(&["switch", branch])?;
        Ok(())
    }

    /// Create `branch` at `start` without checking it out.
    pub fn create_branch(&self, branch: &str, start: &str) -> anyhow::Result<()> {
        self.run_command(&["branch", "--no-track", branch, start])?;
        Ok(())
    }

    pub fn delete_branch(&self, branch: &str, force: bool) -> anyhow::Result<()> {
        let flag = if force { "-D" } else { "-d" };
        self.run_command(&["branch", flag, "--", branch])?;
        Ok(())
    }

    /// Stage everything: tracked modifications, deletions and untracked files.
    pub fn stage_all(&self) -> anyhow::Result<()> {
        self.run_command(&["add", "--all"])?;
        Ok(())
    }

    pub fn commit(&self, message: &str, allow_empty: bool) -> anyhow::Result<()> {
        let mut args = vec!["commit", "--message", message];
        if allow_empty {
            args.push("--allow-empty");
        }
        self.run_command(&args)?;
        Ok(())
    }

    /// Push `branch` to `remote`, optionally recording it as the upstream.
    pub fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> anyhow::Result<()> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("--set-upstream");
        }
        args.extend([remote, branch]);
        self.run_command(&args)?;
        Ok(())
    }

    /// Move the current branch to `target`, keeping uncommitted changes.
    ///
    /// `--keep` refuses (rather than discards) when a local change touches a
    /// file that differs between HEAD and `target`.
    pub fn reset_keep(&self, target: &str) -> anyhow::Result<()> {
        self.run_command(&["reset", "--keep", target])?;
        Ok(())
    }
}
