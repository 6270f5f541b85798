//! Carry out a chosen action: plan it, then run the steps against git and GitHub.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use color_print::cformat;

mod plan;

pub use plan::{Location, PlanContext, Step, plan};

use crate::config::Config;
use crate::git::{GitError, Repository};
use crate::github::{self, NewPr, PrInfo};
use crate::link::{LinkMode, LinkOutcome, link_entries};
use crate::shell_exec::run_hook;
use crate::styling::{eprintln, format_with_gutter, progress_message, warning_message};

/// Pull request fields shared by every `CreatePr` step.
#[derive(Debug, Clone)]
pub struct PrOptions {
    pub title: String,
    pub body: String,
    pub draft: bool,
}

/// What a run produced.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    pub worktree: Option<PathBuf>,
    pub pr: Option<PrInfo>,
    pub completed: Vec<Step>,
}

/// Runs planned steps in order, stopping at the first failure.
pub struct Executor<'a> {
    repo: &'a Repository,
    remote: Option<String>,
    worktree_path: PathBuf,
    pr: PrOptions,
}

impl<'a> Executor<'a> {
    pub fn new(repo: &'a Repository, worktree_path: PathBuf, pr: PrOptions) -> anyhow::Result<Self> {
        Ok(Self {
            repo,
            remote: repo.primary_remote()?,
            worktree_path,
            pr,
        })
    }

    pub fn run(&self, steps: &[Step]) -> anyhow::Result<Outcome> {
        self.preflight(steps)?;
        let mut outcome = Outcome::default();
        // One entry per Stash step: its keep_index flag, or None if nothing was stashed
        let mut stashes: Vec<Option<bool>> = Vec::new();

        for step in steps {
            eprintln!("{}", progress_message(cformat!("<bold>{step}</>")));
            log::info!("Running step: {step:?}");
            self.run_step(step, &mut outcome, &mut stashes)
                .map_err(|e| step_failed(step, e))?;
            outcome.completed.push(step.clone());
        }

        Ok(outcome)
    }

    /// Refuse up front when a branch or worktree path the plan creates is taken,
    /// so nothing has changed when the run fails.
    fn preflight(&self, steps: &[Step]) -> anyhow::Result<()> {
        for step in steps {
            let (branch, path) = match step {
                Step::SwitchCreate { branch } | Step::CreateBranch { branch } => (Some(branch), None),
                Step::AddWorktreeNewBranch { path, branch, .. } => (Some(branch), Some(path)),
                Step::AddWorktree { path, .. } => (None, Some(path)),
                _ => continue,
            };
            if let Some(branch) = branch
                && self.repo.branch_exists(branch)?
            {
                return Err(GitError::BranchAlreadyExists {
                    branch: branch.clone(),
                }
                .into());
            }
            if let Some(path) = path
                && path.exists()
            {
                return Err(GitError::WorktreePathExists { path: path.clone() }.into());
            }
        }
        Ok(())
    }

    fn run_step(
        &self,
        step: &Step,
        outcome: &mut Outcome,
        stashes: &mut Vec<Option<bool>>,
    ) -> anyhow::Result<()> {
        let repo = self.repo;
        match step {
            Step::Stash {
                message,
                keep_index,
            } => {
                let stashed = repo.stash_push(message, *keep_index)?;
                if !stashed {
                    log::debug!("Nothing to stash");
                }
                stashes.push(stashed.then_some(*keep_index));
            }
            // The staged part of a keep-index stash was committed to the new branch
            Step::StashPop => match stashes.pop().flatten() {
                Some(true) => repo.stash_pop_unstaged()?,
                Some(false) => repo.stash_pop()?,
                None => {}
            },
            Step::SwitchCreate { branch } => repo.switch_create(branch)?,
            Step::SwitchBack { branch } => repo.switch(branch)?,
            Step::CreateBranch { branch } => repo.create_branch(branch, "HEAD")?,
            Step::CommitStaged { message } => repo.commit(message, false)?,
            Step::CommitAll { message, location } => {
                let repo = self.repo_at(*location);
                repo.stage_all()?;
                repo.commit(message, false)?;
            }
            Step::EmptyCommit { message, location } => {
                self.repo_at(*location).commit(message, true)?;
            }
            Step::ResetBaseToUpstream { target } => repo.reset_keep(target)?,
            Step::PushBase { branch } => repo.push(self.remote()?, branch, false)?,
            Step::Push { branch, location } => {
                self.repo_at(*location).push(self.remote()?, branch, true)?;
            }
            Step::CreatePr {
                head,
                base,
                location,
            } => {
                let pr = github::create_pr(
                    self.repo_at(*location).path(),
                    &NewPr {
                        base,
                        head,
                        title: &self.pr.title,
                        body: &self.pr.body,
                        draft: self.pr.draft,
                    },
                )?;
                eprintln!(
                    "{}",
                    progress_message(cformat!("Opened PR <bold>#{}</> {}", pr.number, pr.url))
                );
                outcome.pr = Some(pr);
            }
            Step::AddWorktreeNewBranch {
                path,
                branch,
                start,
            } => {
                repo.add_worktree_new_branch(path, branch, start)?;
                outcome.worktree = Some(path.clone());
            }
            Step::AddWorktree { path, branch } => {
                repo.add_worktree(path, branch)?;
                outcome.worktree = Some(path.clone());
            }
        }
        Ok(())
    }

    fn repo_at(&self, location: Location) -> Repository {
        match location {
            Location::Here => self.repo.clone(),
            Location::NewWorktree => self.repo.worktree_at(&self.worktree_path),
        }
    }

    fn remote(&self) -> anyhow::Result<&str> {
        self.remote.as_deref().ok_or_else(|| {
            GitError::ParseError("No git remote configured to push to".into()).into()
        })
    }
}

/// Name the step in command failures; domain errors keep their own message and hint.
fn step_failed(step: &Step, err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<GitError>() {
        Some(GitError::CommandFailed { error, .. } | GitError::GhFailed { error, .. }) => {
            GitError::StepFailed {
                step: step.to_string(),
                error: error.clone(),
            }
            .into()
        }
        Some(_) => err,
        None => GitError::StepFailed {
            step: step.to_string(),
            error: format!("{err:#}"),
        }
        .into(),
    }
}

/// Set up a freshly created worktree: link shared files from the main
/// worktree, then run `post-create` commands in it.
///
/// Hook failures are reported as warnings; the worktree and PR already exist.
pub fn prepare_worktree(
    config: &Config,
    main_root: &Path,
    worktree: &Path,
    vars: &BTreeMap<&str, &str>,
) -> anyhow::Result<()> {
    if !config.link.is_empty() {
        let results = link_entries(main_root, worktree, &config.link, LinkMode::Symlink, false)?;
        for result in results {
            if result.outcome == LinkOutcome::Linked {
                log::info!("Linked {}", result.entry);
            }
        }
    }

    for command in config.post_create_commands(vars)? {
        eprintln!("{}", progress_message(cformat!("Running <bold>{command}</>")));
        match run_hook(&command, worktree) {
            Ok(output) if !output.is_empty() => eprintln!("{}", format_with_gutter(&output)),
            Ok(_) => {}
            Err(e) => eprintln!("{}\n{e}", warning_message("post-create command failed")),
        }
    }

    Ok(())
}
