//! Turn "what state is my checkout in?" into "branch, worktree and pull request".
//!
//! `wtpr` inspects the current git working copy (branch, staged and unstaged
//! changes, commits relative to the base branch, worktree kind), classifies it
//! into one of a fixed set of scenarios, and offers the actions that make sense
//! for it. The `wtpr` binary drives this library; the library API is not stable.
//!
//! ```no_run
//! use wtpr::git::Repository;
//! use wtpr::state::{AnalyzeOptions, analyze};
//!
//! let repo = Repository::current();
//! let report = analyze(&repo, &AnalyzeOptions { base_branch: "main".into(), verbose: false })?;
//! println!("{}: {:?}", report.scenario, report.recommended_action);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod execute;
pub mod git;
pub mod github;
pub mod link;
pub mod shell_exec;
pub mod state;
pub mod styling;
