use std::path::PathBuf;

use color_print::cformat;
use serde::Serialize;
use wtpr::git::{Repository, Worktree};
use wtpr::github::{self, PrInfo, PrState};
use wtpr::styling::{eprintln, pad_visible, println, visual_width, warning_message};

use crate::cli::OutputFormat;

/// PR fields shown by `list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrSummary {
    pub number: u32,
    pub state: PrState,
    pub url: String,
    pub draft: bool,
}

impl From<PrInfo> for PrSummary {
    fn from(pr: PrInfo) -> Self {
        Self {
            number: pr.number,
            state: pr.state,
            url: pr.url,
            draft: pr.is_draft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub path: PathBuf,
    pub branch: Option<String>,
    pub head: String,
    pub is_main: bool,
    pub detached: bool,
    pub pr: Option<PrSummary>,
}

impl ListEntry {
    fn new(worktree: &Worktree, is_main: bool, pr: Option<PrInfo>) -> Self {
        Self {
            path: worktree.path.clone(),
            branch: worktree.branch.clone(),
            head: worktree.short_head().to_string(),
            is_main,
            detached: worktree.detached,
            pr: pr.map(PrSummary::from),
        }
    }
}

pub fn handle_list(format: OutputFormat, no_pr: bool) -> anyhow::Result<()> {
    let repo = Repository::current();
    repo.ensure_repository()?;
    let list = repo.list_worktrees()?;

    let lookup_prs = !no_pr && github::gh_available();
    if !no_pr && !lookup_prs {
        log::info!("gh unavailable; listing without PR status");
    }

    let entries: Vec<ListEntry> = list
        .worktrees
        .iter()
        .enumerate()
        .map(|(i, wt)| {
            let pr = match (&wt.branch, lookup_prs) {
                (Some(branch), true) => match github::pr_for_branch(&wt.path, branch) {
                    Ok(pr) => pr,
                    Err(e) => {
                        log::warn!("PR lookup for {branch} failed: {e:#}");
                        None
                    }
                },
                _ => None,
            };
            ListEntry::new(wt, i == 0, pr)
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            if entries.is_empty() {
                eprintln!("{}", warning_message("No worktrees found"));
            } else {
                println!("{}", render_table(&entries));
            }
        }
    }
    Ok(())
}

fn render_table(entries: &[ListEntry]) -> String {
    let rows: Vec<[String; 4]> = entries
        .iter()
        .map(|e| {
            let branch = match &e.branch {
                Some(b) => cformat!("<bold>{b}</>"),
                None => cformat!("<dim>(detached)</>"),
            };
            let marker = if e.is_main {
                cformat!("<cyan>main</>")
            } else {
                String::new()
            };
            let pr = match &e.pr {
                Some(pr) => {
                    let state = match pr.state {
                        PrState::Open if pr.draft => cformat!("<dim>draft</>"),
                        PrState::Open => cformat!("<green>open</>"),
                        PrState::Merged => cformat!("<magenta>merged</>"),
                        PrState::Closed => cformat!("<red>closed</>"),
                    };
                    format!("#{} {state}", pr.number)
                }
                None => String::new(),
            };
            [
                branch,
                cformat!("<dim>{}</>", e.head),
                [marker, pr]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
                e.path.display().to_string(),
            ]
        })
        .collect();

    let widths: Vec<usize> = (0..3)
        .map(|col| rows.iter().map(|r| visual_width(&r[col])).max().unwrap_or(0))
        .collect();

    rows.iter()
        .map(|r| {
            let mut line = String::new();
            for col in 0..3 {
                line.push_str(&pad_visible(&r[col], widths[col]));
                line.push_str("  ");
            }
            line.push_str(&r[3]);
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
