//! Compose probe, classifier and catalog into one [`StateAnalysisReport`].

use serde::Serialize;

use super::catalog::{ScenarioContext, get_choices};
use super::classify::classify;
use super::probe::GitStateProbe;
use super::types::{ActionType, GitState, Scenario, StateAction, WorktreeType};

/// An action offered in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableAction {
    pub key: ActionType,
    pub label: String,
    /// Full recipe handed to the executor; not part of the JSON contract.
    #[serde(skip)]
    pub recipe: StateAction,
}

/// Everything known about the current state and what to do next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateAnalysisReport {
    pub scenario: Scenario,
    pub scenario_description: String,
    pub current_branch: Option<String>,
    pub base_branch: String,
    pub worktree_type: WorktreeType,
    pub has_staged_changes: bool,
    pub has_unstaged_changes: bool,
    pub has_changes: bool,
    pub local_commits: Vec<String>,
    pub staged_files: Vec<String>,
    pub unstaged_files: Vec<String>,
    pub available_actions: Vec<AvailableAction>,
    pub recommended_action: Option<ActionType>,
    /// Catalog prompt for the scenario, absent when the scenario delegates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_message: Option<String>,
}

impl StateAnalysisReport {
    /// Build the report for a snapshot. Pure; never fails.
    pub fn from_state(state: GitState) -> Self {
        let scenario = classify(&state);

        let (available_actions, message, sub_message) = match get_choices(scenario, &state) {
            // The caller re-runs analysis in the right worktree if it needs more
            ScenarioContext::Delegate => (Vec::new(), None, None),
            ScenarioContext::Choices(set) => {
                let actions: Vec<AvailableAction> = set
                    .actions()
                    .map(|(label, recipe)| AvailableAction {
                        key: recipe.action,
                        label: label.to_string(),
                        recipe,
                    })
                    .collect();
                (actions, Some(set.message), set.sub_message)
            }
        };
        let recommended_action = available_actions.first().map(|a| a.key);

        Self {
            scenario,
            scenario_description: scenario.description().to_string(),
            has_staged_changes: state.has_staged_changes(),
            has_unstaged_changes: state.has_unstaged_changes(),
            has_changes: state.has_changes(),
            current_branch: state.current_branch,
            base_branch: state.base_branch,
            worktree_type: state.worktree_type,
            local_commits: state.local_commits,
            staged_files: state.staged_files,
            unstaged_files: state.unstaged_files,
            available_actions,
            recommended_action,
            message,
            sub_message,
        }
    }

    /// Look up an offered action by key.
    pub fn action(&self, key: ActionType) -> Option<&AvailableAction> {
        self.available_actions.iter().find(|a| a.key == key)
    }

    pub fn recommended(&self) -> Option<&AvailableAction> {
        self.available_actions.first()
    }

    /// Keys of all offered actions, for error messages.
    pub fn action_keys(&self) -> Vec<String> {
        self.available_actions
            .iter()
            .map(|a| a.key.to_string())
            .collect()
    }
}

/// Inputs for [`analyze`].
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub base_branch: String,
    /// Log the snapshot and classification at info level.
    pub verbose: bool,
}

/// Probe the current state and build the report.
///
/// Probe failures propagate unchanged; they are never replaced by a default scenario.
pub fn analyze(
    probe: &impl GitStateProbe,
    options: &AnalyzeOptions,
) -> anyhow::Result<StateAnalysisReport> {
    let state = probe.probe(&options.base_branch)?;
    let report = StateAnalysisReport::from_state(state);

    if options.verbose {
        log::info!(
            "Classified as {} ({} staged, {} unstaged, {} local commits)",
            report.scenario,
            report.staged_files.len(),
            report.unstaged_files.len(),
            report.local_commits.len()
        );
        match report.recommended_action {
            Some(action) => log::info!("Recommended action: {action}"),
            None => log::info!("No recommended action"),
        }
    }

    Ok(report)
}
