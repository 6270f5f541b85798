use color_print::cformat;
use wtpr::git::{GitError, Repository, Worktree};
use wtpr::github::{self, PrInfo};
use wtpr::styling::{
    eprintln, format_with_gutter, hint_message, info_message, progress_message, success_message,
    warning_message,
};

/// What `cleanup` does with one linked worktree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Remove,
    /// PR is finished but the worktree has uncommitted changes.
    SkipDirty,
    KeepOpen,
    NoPr,
}

fn cleanup_decision(pr: Option<&PrInfo>, dirty: bool, force: bool) -> Decision {
    match pr {
        None => Decision::NoPr,
        Some(pr) if !pr.state.is_finished() => Decision::KeepOpen,
        Some(_) if dirty && !force => Decision::SkipDirty,
        Some(_) => Decision::Remove,
    }
}

struct Candidate<'a> {
    worktree: &'a Worktree,
    branch: &'a str,
    pr: PrInfo,
}

pub fn handle_cleanup(dry_run: bool, force: bool) -> anyhow::Result<()> {
    let repo = Repository::current();
    repo.ensure_repository()?;
    if !github::gh_available() {
        return Err(GitError::GhUnavailable {
            error: "gh is not installed or not authenticated".into(),
        }
        .into());
    }

    let list = repo.list_worktrees()?;
    let mut removable = Vec::new();
    let mut skipped = Vec::new();

    // Main worktree is never a candidate
    for worktree in list.linked() {
        let Some(branch) = worktree.branch.as_deref() else {
            log::debug!("Skipping detached worktree {}", worktree.path.display());
            continue;
        };
        if worktree.prunable.is_some() {
            log::debug!("Skipping prunable worktree {}", worktree.path.display());
            continue;
        }
        let pr = github::pr_for_branch(&worktree.path, branch)?;
        let dirty = repo.worktree_at(&worktree.path).is_dirty()?;
        match (cleanup_decision(pr.as_ref(), dirty, force), pr) {
            (Decision::Remove, Some(pr)) => removable.push(Candidate {
                worktree,
                branch,
                pr,
            }),
            (Decision::SkipDirty, _) => skipped.push(branch),
            (decision, _) => log::debug!("Keeping {branch}: {decision:?}"),
        }
    }

    for branch in &skipped {
        eprintln!(
            "{}",
            warning_message(cformat!(
                "Skipping <bold>{branch}</>: worktree has uncommitted changes"
            ))
        );
    }
    if !skipped.is_empty() {
        eprintln!("{}", hint_message("Use --force to remove them anyway"));
    }

    if removable.is_empty() {
        eprintln!("{}", info_message("No worktrees with merged or closed PRs"));
        return Ok(());
    }

    if dry_run {
        let items: Vec<String> = removable
            .iter()
            .map(|c| {
                format!(
                    "{} (#{} {}) {}",
                    c.branch,
                    c.pr.number,
                    c.pr.state,
                    c.worktree.path.display()
                )
            })
            .collect();
        let word = if items.len() == 1 { "worktree" } else { "worktrees" };
        eprintln!(
            "{}\n{}",
            info_message(format!("Would remove {} {word}:", items.len())),
            format_with_gutter(&items.join("\n"))
        );
        return Ok(());
    }

    for candidate in &removable {
        eprintln!(
            "{}",
            progress_message(cformat!(
                "Removing <bold>{}</> (PR #{} {})",
                candidate.branch,
                candidate.pr.number,
                candidate.pr.state
            ))
        );
        repo.remove_worktree(&candidate.worktree.path, force)?;
        repo.delete_branch(candidate.branch, true)?;
    }
    repo.prune_worktrees()?;

    let word = if removable.len() == 1 { "worktree" } else { "worktrees" };
    eprintln!(
        "{}",
        success_message(format!("Removed {} {word}", removable.len()))
    );
    Ok(())
}
