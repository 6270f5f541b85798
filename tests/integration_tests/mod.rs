mod cli;
mod execute;
mod state;
mod worktrees;
