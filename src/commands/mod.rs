pub(crate) mod cleanup;
pub(crate) mod create;
pub(crate) mod link;
pub(crate) mod list;
pub(crate) mod state;

use std::path::PathBuf;

use wtpr::config::Config;
use wtpr::git::Repository;

/// What every command needs: the repository it runs in and the layered config.
pub(crate) struct CommandEnv {
    pub repo: Repository,
    /// Root of the worktree the command started in.
    pub worktree_root: PathBuf,
    pub main_root: PathBuf,
    pub config: Config,
}

impl CommandEnv {
    /// Fails with `NotARepository` outside a git work tree.
    pub fn load() -> anyhow::Result<Self> {
        let repo = Repository::current();
        repo.ensure_repository()?;
        let worktree_root = repo.worktree_root()?;
        let main_root = repo.main_worktree_root()?;
        let config = Config::load(Some(&worktree_root))?;
        Ok(Self {
            repo,
            worktree_root,
            main_root,
            config,
        })
    }

    pub fn base_branch(&self, cli_base: Option<&str>) -> anyhow::Result<String> {
        self.config.resolve_base_branch(cli_base, &self.repo)
    }
}
