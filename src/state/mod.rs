//! Git state analysis: snapshot, classify, and offer actions.
//!
//! The pipeline is [`GitStateProbe::probe`] → [`classify`] → [`get_choices`],
//! composed by [`analyze`] into a [`StateAnalysisReport`]. Everything after the
//! probe is pure and works on plain [`GitState`] values.

mod catalog;
mod classify;
mod probe;
mod report;
mod types;

pub use catalog::{CANCEL_LABEL, ChoiceSet, ScenarioChoice, ScenarioContext, get_choices};
pub use classify::classify;
pub use probe::GitStateProbe;
pub use report::{AnalyzeOptions, AvailableAction, StateAnalysisReport, analyze};
pub use types::{
    ActionType, BranchFrom, CommitRelation, GitState, Scenario, StateAction, WorktreeType,
};
