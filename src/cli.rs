use clap::builder::styling::{AnsiColor, Color, Styles};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wtpr::state::ActionType;

/// Help colors, matching the message styling
fn help_styles() -> Styles {
    let bold = |color| {
        anstyle::Style::new()
            .bold()
            .fg_color(Some(Color::Ansi(color)))
    };
    Styles::styled()
        .header(bold(AnsiColor::Green))
        .usage(bold(AnsiColor::Green))
        .literal(bold(AnsiColor::Cyan))
        .placeholder(anstyle::Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(bold(AnsiColor::Red))
        .valid(bold(AnsiColor::Green))
        .invalid(bold(AnsiColor::Yellow))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Text,
    /// JSON on stdout
    Json,
}

#[derive(Parser)]
#[command(name = "wtpr")]
#[command(about = "Turn the current git state into a worktree, a branch and a pull request")]
#[command(version)]
#[command(disable_help_subcommand = true)]
#[command(styles = help_styles())]
#[command(after_long_help = "\
Getting started

  wtpr state                    # What can be done from here
  wtpr create feature-x         # Branch, worktree and PR for the current changes
  wtpr list                     # Worktrees with their PRs
  wtpr cleanup                  # Remove worktrees whose PR is merged or closed")]
pub(crate) struct Cli {
    /// Working directory for this command
    #[arg(
        short = 'C',
        global = true,
        value_name = "path",
        display_order = 100,
        help_heading = "Global Options"
    )]
    pub directory: Option<PathBuf>,

    /// User config file path
    #[arg(
        long,
        global = true,
        value_name = "path",
        display_order = 101,
        help_heading = "Global Options"
    )]
    pub config: Option<PathBuf>,

    /// Show progress detail (-v) or every git command (-vv)
    #[arg(
        long,
        short = 'v',
        global = true,
        action = clap::ArgAction::Count,
        display_order = 102,
        help_heading = "Global Options"
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Analyze the current git state and list available actions
    State {
        /// Branch PRs target [default: from config, then the remote's default branch]
        #[arg(long, short = 'b')]
        base: Option<String>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Create a branch, worktree and PR from the current state
    Create {
        /// Name of the new branch
        branch: Option<String>,

        /// Branch the PR targets
        #[arg(long, short = 'b')]
        base: Option<String>,

        /// Action to run instead of choosing interactively
        #[arg(long, short = 'a', value_name = "key")]
        action: Option<ActionType>,

        /// PR title and commit message [default: branch name]
        #[arg(long, short = 't')]
        title: Option<String>,

        /// PR body
        #[arg(long, default_value = "")]
        body: String,

        /// Open the PR as a draft
        #[arg(long)]
        draft: bool,

        /// Run the recommended action without prompting
        #[arg(long, short = 'y')]
        yes: bool,

        /// Print the steps without running them
        #[arg(long)]
        dry_run: bool,
    },

    /// List worktrees with their pull requests
    List {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Skip PR lookups
        #[arg(long)]
        no_pr: bool,
    },

    /// Remove worktrees whose PR is merged or closed
    Cleanup {
        /// Show what would be removed
        #[arg(long)]
        dry_run: bool,

        /// Also remove worktrees with uncommitted changes
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Link configured shared files into worktrees
    Link {
        /// Worktrees to link into, by branch or path [default: all linked worktrees]
        worktrees: Vec<String>,

        /// Copy instead of symlinking
        #[arg(long)]
        copy: bool,

        /// Replace existing files
        #[arg(long, short = 'f')]
        force: bool,
    },
}
