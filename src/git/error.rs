//! Error types for git, GitHub and worktree operations.
//!
//! `GitError` is a typed enum for domain errors that can be pattern-matched
//! and tested. Use `.into()` to convert to `anyhow::Error` while preserving the
//! type for `downcast_ref`. Display produces styled output for users.

use std::path::PathBuf;

use color_print::cformat;

use crate::styling::{error_message, format_with_gutter, hint_message};

/// Domain errors for git and worktree operations.
///
/// ```ignore
/// return Err(GitError::DetachedHead { action: Some("push".into()) }.into());
///
/// if let Some(GitError::NotARepository { .. }) = err.downcast_ref() {
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub enum GitError {
    // Environment errors
    NotARepository {
        path: PathBuf,
        error: String,
    },
    GitUnavailable {
        error: String,
    },
    CommandFailed {
        command: String,
        error: String,
    },
    ParseError(String),

    // Git state errors
    DetachedHead {
        action: Option<String>,
    },
    BranchAlreadyExists {
        branch: String,
    },
    BaseBranchNotFound {
        branch: String,
    },
    WorktreePathExists {
        path: PathBuf,
    },
    CannotRemoveMainWorktree,

    // Action selection errors
    BranchNameRequired {
        action: String,
    },
    ActionNotAvailable {
        action: String,
        available: Vec<String>,
    },
    InPrWorktree {
        branch: Option<String>,
    },
    NoActionChosen {
        recommended: Option<String>,
    },
    NothingToDo {
        scenario: String,
    },
    StepFailed {
        step: String,
        error: String,
    },

    // GitHub CLI errors
    GhUnavailable {
        error: String,
    },
    GhFailed {
        command: String,
        error: String,
    },
}

impl std::error::Error for GitError {}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::NotARepository { path, error } => {
                let path = path.display();
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!("Not a git repository: <bold>{path}</>")),
                    format_with_gutter(error.trim())
                )
            }

            GitError::GitUnavailable { error } => write!(
                f,
                "{}\n{}",
                error_message(format!("Could not run git: {error}")),
                hint_message("Install git and make sure it is on PATH")
            ),

            GitError::CommandFailed { command, error } => {
                write!(
                    f,
                    "{}",
                    error_message(cformat!("<bold>{command}</> failed"))
                )?;
                let trimmed = error.trim();
                if !trimmed.is_empty() {
                    write!(f, "\n{}", format_with_gutter(trimmed))?;
                }
                Ok(())
            }

            GitError::ParseError(message) => write!(f, "{}", error_message(message)),

            GitError::DetachedHead { action } => {
                let message = match action {
                    Some(action) => format!("Cannot {action}: not on a branch (detached HEAD)"),
                    None => "Not on a branch (detached HEAD)".to_string(),
                };
                write!(
                    f,
                    "{}\n{}",
                    error_message(&message),
                    hint_message(cformat!(
                        "To switch to a branch, run <bright-black>git switch <<branch>></>"
                    ))
                )
            }

            GitError::BranchAlreadyExists { branch } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("Branch <bold>{branch}</> already exists")),
                hint_message("Choose a different branch name")
            ),

            GitError::BaseBranchNotFound { branch } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("Base branch <bold>{branch}</> not found")),
                hint_message(cformat!(
                    "Pass <bright-black>--base <<branch>></> or set <bright-black>base-branch</> in config"
                ))
            ),

            GitError::WorktreePathExists { path } => {
                let path = path.display();
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!("Worktree path <bold>{path}</> already exists")),
                    hint_message("Remove the directory or adjust worktree-path in config")
                )
            }

            GitError::CannotRemoveMainWorktree => write!(
                f,
                "{}",
                error_message("The main worktree cannot be removed")
            ),

            GitError::BranchNameRequired { action } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("Action <bold>{action}</> creates a new branch")),
                hint_message(cformat!(
                    "Pass a branch name: <bright-black>wtpr create <<branch>></>"
                ))
            ),

            GitError::ActionNotAvailable { action, available } => {
                let hint = if available.is_empty() {
                    "No actions are available in this state".to_string()
                } else {
                    format!("Available actions: {}", available.join(", "))
                };
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!(
                        "Action <bold>{action}</> is not available in the current state"
                    )),
                    hint_message(hint)
                )
            }

            GitError::InPrWorktree { branch } => {
                let message = match branch {
                    Some(b) => cformat!("<bold>{b}</> is already checked out in a PR worktree"),
                    None => "Already in a PR worktree".to_string(),
                };
                write!(
                    f,
                    "{}\n{}",
                    error_message(message),
                    hint_message("Run from the main worktree to start new work")
                )
            }

            GitError::NoActionChosen { recommended } => {
                let hint = match recommended {
                    Some(key) => cformat!(
                        "Pass <bright-black>--action <<key>></> or <bright-black>--yes</> to run <bold>{key}</>"
                    ),
                    None => cformat!("Pass <bright-black>--action <<key>></>"),
                };
                write!(
                    f,
                    "{}\n{}",
                    error_message("No action chosen and no terminal to prompt on"),
                    hint_message(hint)
                )
            }

            GitError::NothingToDo { scenario } => write!(
                f,
                "{}",
                error_message(cformat!("No actions available for <bold>{scenario}</>"))
            ),

            GitError::StepFailed { step, error } => {
                write!(f, "{}", error_message(cformat!("Failed to {step}")))?;
                let trimmed = error.trim();
                if !trimmed.is_empty() {
                    write!(f, "\n{}", format_with_gutter(trimmed))?;
                }
                Ok(())
            }

            GitError::GhUnavailable { error } => write!(
                f,
                "{}\n{}",
                error_message(format!("GitHub CLI unavailable: {error}")),
                hint_message(cformat!(
                    "Install gh and run <bright-black>gh auth login</>"
                ))
            ),

            GitError::GhFailed { command, error } => {
                write!(
                    f,
                    "{}",
                    error_message(cformat!("<bold>{command}</> failed"))
                )?;
                let trimmed = error.trim();
                if !trimmed.is_empty() {
                    write!(f, "\n{}", format_with_gutter(trimmed))?;
                }
                Ok(())
            }
        }
    }
}
