use std::path::{Path, PathBuf};

use color_print::cformat;
use wtpr::git::{GitError, WorktreeList};
use wtpr::link::{LinkMode, LinkOutcome, LinkResult, link_entries};
use wtpr::styling::{eprintln, hint_message, info_message, success_message, warning_message};

use super::CommandEnv;

pub fn handle_link(worktrees: &[String], copy: bool, force: bool) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    if env.config.link.is_empty() {
        eprintln!("{}", info_message("No files configured to link"));
        eprintln!(
            "{}",
            hint_message(cformat!(
                "Add <bright-black>link = [\".env\"]</> to .config/wtpr.toml"
            ))
        );
        return Ok(());
    }

    let list = env.repo.list_worktrees()?;
    let targets = resolve_targets(&list, worktrees, &env.main_root)?;
    if targets.is_empty() {
        eprintln!("{}", info_message("No linked worktrees"));
        return Ok(());
    }

    let mode = if copy { LinkMode::Copy } else { LinkMode::Symlink };
    for target in &targets {
        let results = link_entries(&env.main_root, target, &env.config.link, mode, force)?;
        report_results(target, &results);
    }
    Ok(())
}

/// Worktrees named on the command line (by branch, else by path), or every
/// linked worktree when none are given. The main worktree is the source and
/// never a target.
fn resolve_targets(
    list: &WorktreeList,
    requested: &[String],
    main_root: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    if requested.is_empty() {
        return Ok(list.linked().map(|wt| wt.path.clone()).collect());
    }
    requested
        .iter()
        .map(|name| {
            let path = match list.for_branch(name) {
                Some(wt) => wt.path.clone(),
                None => {
                    let path = Path::new(name);
                    if !path.is_dir() {
                        return Err(GitError::ParseError(format!(
                            "{name} is neither a worktree branch nor a directory"
                        ))
                        .into());
                    }
                    dunce::canonicalize(path)?
                }
            };
            if same_path(&path, main_root) {
                return Err(GitError::ParseError(
                    "cannot link into the main worktree; it is the source of linked files".into(),
                )
                .into());
            }
            Ok(path)
        })
        .collect()
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn report_results(target: &Path, results: &[LinkResult]) {
    let done = results
        .iter()
        .filter(|r| matches!(r.outcome, LinkOutcome::Linked | LinkOutcome::Copied))
        .count();
    for result in results {
        match result.outcome {
            LinkOutcome::Exists => eprintln!(
                "{}",
                warning_message(cformat!(
                    "<bold>{}</> already exists in {}",
                    result.entry,
                    target.display()
                ))
            ),
            LinkOutcome::MissingSource => eprintln!(
                "{}",
                warning_message(cformat!(
                    "<bold>{}</> not found in the main worktree",
                    result.entry
                ))
            ),
            LinkOutcome::Linked | LinkOutcome::Copied => {
                log::info!("{} {}", result.outcome, result.target.display());
            }
        }
    }
    eprintln!(
        "{}",
        success_message(cformat!(
            "Linked {done} of {} into <bold>{}</>",
            results.len(),
            target.display()
        ))
    );
}
