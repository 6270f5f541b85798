use std::io::Write;
use std::process;

use clap::Parser;
use wtpr::git::GitError;
use wtpr::styling::{eprintln, error_message};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(path) = cli.config {
        wtpr::config::set_config_path(path);
    }

    if let Some(dir) = &cli.directory
        && let Err(e) = std::env::set_current_dir(dir)
    {
        eprintln!(
            "{}",
            error_message(format!("Cannot change to {}: {e}", dir.display()))
        );
        process::exit(1);
    }

    let verbose = cli.verbose > 0;
    let result = match cli.command {
        Commands::State { base, format } => {
            commands::state::handle_state(base.as_deref(), format, verbose)
        }
        Commands::Create {
            branch,
            base,
            action,
            title,
            body,
            draft,
            yes,
            dry_run,
        } => commands::create::handle_create(commands::create::CreateArgs {
            branch,
            base,
            action,
            title,
            body,
            draft,
            yes,
            dry_run,
            verbose,
        }),
        Commands::List { format, no_pr } => commands::list::handle_list(format, no_pr),
        Commands::Cleanup { dry_run, force } => commands::cleanup::handle_cleanup(dry_run, force),
        Commands::Link {
            worktrees,
            copy,
            force,
        } => commands::link::handle_link(&worktrees, copy, force),
    };

    if let Err(e) = result {
        // GitError Display is already styled with its own hints
        if e.downcast_ref::<GitError>().is_some() {
            eprintln!("{e}");
        } else {
            eprintln!("{}", error_message(format!("{e:#}")));
        }
        process::exit(1);
    }
}

/// `-v` shows info, `-vv` debug (every git and gh command). `RUST_LOG` overrides both.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            let level = record.level();
            if level <= log::Level::Warn {
                writeln!(buf, "{level}: {}", record.args())
            } else {
                writeln!(buf, "{}", record.args())
            }
        })
        .init();
}
