//! Running external commands: git, gh and user hook commands.
//!
//! Hooks are shell strings. On Unix they run under `sh -c`; on Windows Git Bash
//! is preferred so the same hook syntax works, with PowerShell as a fallback.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use std::time::Instant;

use crate::git::GitError;

static SHELL_CONFIG: OnceLock<ShellConfig> = OnceLock::new();

/// Shell used for hook commands.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub executable: PathBuf,
    /// Arguments before the command string (`-c` for sh).
    pub args: Vec<String>,
    pub name: String,
}

impl ShellConfig {
    pub fn get() -> &'static ShellConfig {
        SHELL_CONFIG.get_or_init(detect_shell)
    }

    /// A `Command` that runs `shell_command` through this shell.
    pub fn command(&self, shell_command: &str) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.args).arg(shell_command);
        cmd
    }
}

fn detect_shell() -> ShellConfig {
    #[cfg(unix)]
    {
        ShellConfig {
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string()],
            name: "sh".to_string(),
        }
    }

    #[cfg(windows)]
    {
        if let Some(bash) = find_git_bash() {
            return ShellConfig {
                executable: bash,
                args: vec!["-c".to_string()],
                name: "Git Bash".to_string(),
            };
        }
        ShellConfig {
            executable: PathBuf::from("powershell.exe"),
            args: vec!["-NoProfile".to_string(), "-Command".to_string()],
            name: "PowerShell".to_string(),
        }
    }
}

/// Locate Git Bash from the `git.exe` on PATH. `which bash` is avoided since it
/// tends to find the WSL launcher first.
#[cfg(windows)]
fn find_git_bash() -> Option<PathBuf> {
    let git = which::which("git").ok()?;
    let root = git.parent()?.parent()?;
    [root.join("bin").join("bash.exe"), root.join("usr").join("bin").join("bash.exe")]
        .into_iter()
        .find(|p| p.exists())
}

/// Execute a command with debug logging and timing.
///
/// All git, gh and hook invocations go through here, so `-vv` shows every
/// external command:
///
/// ```text
/// $ git status --porcelain [feature-x]
/// [wtpr-trace] context=feature-x cmd="git status --porcelain" dur=4.1ms ok=true
/// ```
pub fn run(cmd: &mut Command, context: Option<&str>) -> std::io::Result<std::process::Output> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
    let cmd_str = if args.is_empty() {
        program
    } else {
        format!("{} {}", program, args.join(" "))
    };

    match context {
        Some(ctx) => log::debug!("$ {} [{}]", cmd_str, ctx),
        None => log::debug!("$ {}", cmd_str),
    }

    let t0 = Instant::now();
    let result = cmd.output();
    let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let ctx = context.map(|c| format!("context={c} ")).unwrap_or_default();
    match &result {
        Ok(output) => log::debug!(
            "[wtpr-trace] {}cmd=\"{}\" dur={:.1}ms ok={}",
            ctx,
            cmd_str,
            duration_ms,
            output.status.success()
        ),
        Err(e) => log::debug!(
            "[wtpr-trace] {}cmd=\"{}\" dur={:.1}ms err=\"{}\"",
            ctx,
            cmd_str,
            duration_ms,
            e
        ),
    }

    result
}

/// Run a hook command in `dir` and return its combined output.
///
/// A non-zero exit is a [`GitError::CommandFailed`] carrying the hook's stderr.
pub fn run_hook(command: &str, dir: &Path) -> anyhow::Result<String> {
    let shell = ShellConfig::get();
    let context = crate::git::path_to_logging_context(dir);
    let output = run(shell.command(command).current_dir(dir), Some(&context)).map_err(|e| {
        GitError::CommandFailed {
            command: command.to_string(),
            error: format!("{}: {e}", shell.name),
        }
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        return Err(GitError::CommandFailed {
            command: command.to_string(),
            error: match output.status.code() {
                Some(code) => format!("{}\nexit code {code}", stderr.trim()),
                None => stderr.trim().to_string(),
            },
        }
        .into());
    }

    Ok([stdout.trim_end(), stderr.trim_end()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}
