//! GitHub pull request lookup and creation via the `gh` CLI.
//!
//! `gh` is run from a worktree directory so it auto-detects the repository
//! from the git remotes.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::git::GitError;

/// Fields requested from `gh pr list --json`.
const PR_FIELDS: &str = "number,title,state,url,isDraft,headRefName";

/// How many PRs to fetch per branch; the newest one wins.
const MAX_PRS_TO_FETCH: u32 = 5;

/// Lifecycle state of a pull request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all(serialize = "snake_case", deserialize = "UPPERCASE"))]
#[strum(serialize_all = "snake_case")]
pub enum PrState {
    Open,
    Merged,
    Closed,
}

impl PrState {
    /// Merged or closed PRs no longer need a worktree.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Merged | Self::Closed)
    }
}

/// Pull request metadata from `gh pr list --json ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrInfo {
    pub number: u32,
    pub title: String,
    pub state: PrState,
    pub url: String,
    #[serde(rename(deserialize = "isDraft"), default)]
    pub is_draft: bool,
    #[serde(rename(deserialize = "headRefName"))]
    pub head_ref_name: String,
}

/// Options for `gh pr create`.
#[derive(Debug, Clone)]
pub struct NewPr<'a> {
    pub base: &'a str,
    pub head: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub draft: bool,
}

/// Find the newest PR whose head is `branch`, in any state.
///
/// Uses `gh pr list --head` rather than `gh pr view` so that all-digit branch
/// names are not mistaken for PR numbers.
pub fn pr_for_branch(dir: &Path, branch: &str) -> anyhow::Result<Option<PrInfo>> {
    let limit = MAX_PRS_TO_FETCH.to_string();
    let stdout = run_gh(
        dir,
        &[
            "pr", "list", "--head", branch, "--state", "all", "--limit", &limit, "--json",
            PR_FIELDS,
        ],
    )?;
    let prs = parse_pr_list(&stdout)?;
    Ok(newest_for_head(prs, branch))
}

/// Create a PR and return its metadata.
pub fn create_pr(dir: &Path, pr: &NewPr<'_>) -> anyhow::Result<PrInfo> {
    let mut args = vec![
        "pr", "create", "--base", pr.base, "--head", pr.head, "--title", pr.title, "--body",
        pr.body,
    ];
    if pr.draft {
        args.push("--draft");
    }
    let stdout = run_gh(dir, &args)?;
    log::debug!("Created PR: {}", stdout.trim());

    pr_for_branch(dir, pr.head)?.ok_or_else(|| {
        GitError::GhFailed {
            command: "gh pr create".into(),
            error: format!("PR for {} not found after creation", pr.head),
        }
        .into()
    })
}

/// Whether `gh` is installed and authenticated.
pub fn gh_available() -> bool {
    crate::shell_exec::run(Command::new("gh").args(["auth", "status"]), None)
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn parse_pr_list(stdout: &str) -> anyhow::Result<Vec<PrInfo>> {
    serde_json::from_str(stdout).map_err(|e| {
        GitError::GhFailed {
            command: "gh pr list".into(),
            error: format!("Failed to parse JSON: {e}"),
        }
        .into()
    })
}

/// `gh pr list --head` also matches forks' branches of the same name; keep exact matches
/// and prefer the highest PR number.
fn newest_for_head(prs: Vec<PrInfo>, branch: &str) -> Option<PrInfo> {
    prs.into_iter()
        .filter(|pr| pr.head_ref_name == branch)
        .max_by_key(|pr| pr.number)
}

fn run_gh(dir: &Path, args: &[&str]) -> anyhow::Result<String> {
    let mut cmd = Command::new("gh");
    cmd.args(args)
        .current_dir(dir)
        // Keep JSON and URLs free of ANSI and pager interference
        .env("NO_COLOR", "1")
        .env("GH_PAGER", "")
        .env("GH_PROMPT_DISABLED", "1");
    let output = crate::shell_exec::run(&mut cmd, None).map_err(|e| -> anyhow::Error {
        match e.kind() {
            ErrorKind::NotFound => GitError::GhUnavailable {
                error: e.to_string(),
            }
            .into(),
            _ => anyhow::Error::from(e)
                .context(format!("Failed to execute: gh {}", args.join(" "))),
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        for line in stderr.trim().lines() {
            log::debug!("  ! {}", line);
        }
        let lower = stderr.to_ascii_lowercase();
        if lower.contains("gh auth login") || lower.contains("not logged") {
            return Err(GitError::GhUnavailable { error: stderr }.into());
        }
        return Err(GitError::GhFailed {
            command: format!("gh {}", args.iter().take(2).copied().collect::<Vec<_>>().join(" ")),
            error: stderr,
        }
        .into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
