use color_print::cformat;
use wtpr::state::{AnalyzeOptions, Scenario, StateAnalysisReport, analyze};
use wtpr::styling::{format_heading, hint_message, plural, println};

use super::CommandEnv;
use crate::cli::OutputFormat;

pub fn handle_state(base: Option<&str>, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let options = AnalyzeOptions {
        base_branch: env.base_branch(base)?,
        verbose,
    };
    let report = analyze(&env.repo, &options)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => println!("{}", render_report(&report)),
    }
    Ok(())
}

/// Human-readable report: heading, branch summary, then numbered actions.
pub(crate) fn render_report(report: &StateAnalysisReport) -> String {
    let mut lines = vec![format_heading(
        &report.scenario.to_string(),
        Some(&report.scenario_description),
    )];

    let branch = report.current_branch.as_deref().unwrap_or("(detached)");
    lines.push(cformat!(
        "  Branch <bold>{branch}</>, base <bold>{}</>, {}",
        report.base_branch,
        report.worktree_type
    ));
    lines.push(format!(
        "  {}, {}, {}",
        plural(report.staged_files.len(), "staged file"),
        plural(report.unstaged_files.len(), "unstaged file"),
        plural(report.local_commits.len(), "local commit")
    ));
    for subject in &report.local_commits {
        lines.push(cformat!("    <dim>•</> {subject}"));
    }

    if let Some(message) = &report.message {
        lines.push(String::new());
        lines.push(format!("  {message}"));
        if let Some(sub) = &report.sub_message {
            lines.push(cformat!("  <dim>{sub}</>"));
        }
    }

    if report.scenario == Scenario::PrWorktree {
        lines.push(String::new());
        lines.push(
            hint_message("Already in a PR worktree; run from the main worktree to start new work")
                .into(),
        );
        return lines.join("\n");
    }

    lines.push(String::new());
    for (i, action) in report.available_actions.iter().enumerate() {
        let marker = if Some(action.key) == report.recommended_action {
            cformat!(" <green>(recommended)</>")
        } else {
            String::new()
        };
        lines.push(cformat!(
            "  {}. {} <dim>[{}]</>{marker}",
            i + 1,
            action.label,
            action.key
        ));
    }
    lines.join("\n")
}
