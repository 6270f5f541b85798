use std::collections::BTreeMap;
use std::io::{BufRead, IsTerminal};

use color_print::cformat;
use wtpr::execute::{Executor, PlanContext, PrOptions, Step, plan, prepare_worktree};
use wtpr::git::GitError;
use wtpr::state::{
    ActionType, AnalyzeOptions, AvailableAction, CANCEL_LABEL, Scenario, StateAnalysisReport,
    analyze,
};
use wtpr::styling::{
    eprint, eprintln, format_with_gutter, info_message, println, prompt_message, success_message,
};

use super::CommandEnv;

pub struct CreateArgs {
    pub branch: Option<String>,
    pub base: Option<String>,
    pub action: Option<ActionType>,
    pub title: Option<String>,
    pub body: String,
    pub draft: bool,
    pub yes: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

pub fn handle_create(args: CreateArgs) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let base_branch = env.base_branch(args.base.as_deref())?;
    let report = analyze(
        &env.repo,
        &AnalyzeOptions {
            base_branch: base_branch.clone(),
            verbose: args.verbose,
        },
    )?;

    let Some(chosen) = choose_action(&report, args.action, args.yes)? else {
        eprintln!("{}", info_message("Cancelled"));
        return Ok(());
    };
    let recipe = chosen.recipe;
    log::info!("Chosen action: {}", recipe.action);

    // The branch the PR ends up on, for naming the worktree and the PR
    let pr_branch = if recipe.action.creates_branch() {
        args.branch.clone()
    } else {
        report.current_branch.clone()
    };
    let pr_branch_name = pr_branch.as_deref().unwrap_or_default();
    let repo_name = env.repo.repo_name()?;
    let worktree_path = env
        .config
        .worktree_path_for(&env.main_root, &repo_name, pr_branch_name)?;
    let base_tip = env.repo.base_tip(&base_branch)?;
    let title = args.title.clone().unwrap_or_else(|| pr_branch_name.to_string());

    let steps = plan(
        recipe,
        &PlanContext {
            new_branch: args.branch.as_deref(),
            current_branch: report.current_branch.as_deref(),
            base_branch: &base_branch,
            base_tip: &base_tip,
            worktree_path: &worktree_path,
            message: &title,
        },
    )?;

    if args.dry_run {
        for (i, step) in steps.iter().enumerate() {
            println!("{}. {step}", i + 1);
        }
        return Ok(());
    }

    if steps.iter().any(Step::creates_worktree) && worktree_path.exists() {
        return Err(GitError::WorktreePathExists {
            path: worktree_path,
        }
        .into());
    }

    let executor = Executor::new(
        &env.repo,
        worktree_path.clone(),
        PrOptions {
            title,
            body: args.body,
            draft: args.draft || env.config.draft,
        },
    )?;
    let outcome = executor.run(&steps)?;

    if let Some(worktree) = &outcome.worktree {
        let worktree_str = worktree.to_string_lossy();
        let vars = BTreeMap::from([
            ("repo", repo_name.as_str()),
            ("branch", pr_branch_name),
            ("base_branch", base_branch.as_str()),
            ("worktree_path", worktree_str.as_ref()),
        ]);
        prepare_worktree(&env.config, &env.main_root, worktree, &vars)?;
    }

    let pr = outcome
        .pr
        .as_ref()
        .map(|pr| cformat!(" <bold>#{}</>", pr.number))
        .unwrap_or_default();
    eprintln!(
        "{}",
        success_message(cformat!("Opened PR{pr} for <bold>{pr_branch_name}</>"))
    );
    // Data for scripts: where to continue working
    if let Some(worktree) = &outcome.worktree {
        println!("{}", worktree.display());
    }
    Ok(())
}

/// Pick the action to run: explicit key, interactive prompt, or the recommendation with `--yes`.
///
/// `Ok(None)` means the user cancelled.
fn choose_action(
    report: &StateAnalysisReport,
    requested: Option<ActionType>,
    yes: bool,
) -> anyhow::Result<Option<AvailableAction>> {
    if report.scenario == Scenario::PrWorktree {
        return Err(GitError::InPrWorktree {
            branch: report.current_branch.clone(),
        }
        .into());
    }
    if report.available_actions.is_empty() {
        return Err(GitError::NothingToDo {
            scenario: report.scenario.to_string(),
        }
        .into());
    }

    if let Some(key) = requested {
        return report.action(key).cloned().map(Some).ok_or_else(|| {
            GitError::ActionNotAvailable {
                action: key.to_string(),
                available: report.action_keys(),
            }
            .into()
        });
    }

    if yes {
        return Ok(report.recommended().cloned());
    }

    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return Err(GitError::NoActionChosen {
            recommended: report.recommended_action.map(|a| a.to_string()),
        }
        .into());
    }
    prompt_for_action(report, &mut stdin.lock())
}

fn prompt_for_action(
    report: &StateAnalysisReport,
    input: &mut impl BufRead,
) -> anyhow::Result<Option<AvailableAction>> {
    if let Some(message) = &report.message {
        eprintln!("{}", info_message(message));
    }
    if let Some(sub) = &report.sub_message {
        eprintln!("{}", format_with_gutter(sub));
    }
    let count = report.available_actions.len();
    for (i, action) in report.available_actions.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, action.label);
    }
    eprintln!("  {}. {CANCEL_LABEL}", count + 1);

    loop {
        eprint!("{} ", prompt_message(format!("Choose [1-{}]:", count + 1)));
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match parse_choice(&line, count) {
            Some(Choice::Action(i)) => return Ok(Some(report.available_actions[i].clone())),
            Some(Choice::Cancel) => return Ok(None),
            None => eprintln!("Enter a number between 1 and {}", count + 1),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Choice {
    /// Index into the available actions.
    Action(usize),
    Cancel,
}

/// Parse a 1-based menu entry; the entry after the actions is Cancel. Empty input
/// picks the first (recommended) action.
fn parse_choice(input: &str, action_count: usize) -> Option<Choice> {
    let input = input.trim();
    if input.is_empty() {
        return (action_count > 0).then_some(Choice::Action(0));
    }
    match input.parse::<usize>().ok()? {
        0 => None,
        n if n <= action_count => Some(Choice::Action(n - 1)),
        n if n == action_count + 1 => Some(Choice::Cancel),
        _ => None,
    }
}
