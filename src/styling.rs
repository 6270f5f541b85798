//! Styling for terminal output.
//!
//! Built on the anstyle ecosystem:
//! - anstream for auto-detecting color support (respects `NO_COLOR`, `CLICOLOR_FORCE`)
//! - color-print `cformat!` tags for inline styling
//!
//! ## stdout vs stderr
//!
//! - **stdout**: primary data (state reports, worktree tables, JSON)
//! - **stderr**: status messages (progress, success, errors, hints, warnings)
//!
//! This keeps `wtpr state --format=json | jq` free of status noise.

use std::fmt;

use color_print::{cformat, cstr};

pub use anstream::{eprint, eprintln, print, println, stderr, stdout};
pub use anstyle::Style as AnstyleStyle;

/// Progress symbol (cyan ◎)
pub const PROGRESS_SYMBOL: &str = cstr!("<cyan>◎</>");

/// Success symbol (green ✓)
pub const SUCCESS_SYMBOL: &str = cstr!("<green>✓</>");

/// Error symbol (red ✗)
pub const ERROR_SYMBOL: &str = cstr!("<red>✗</>");

/// Warning symbol (yellow ▲)
pub const WARNING_SYMBOL: &str = cstr!("<yellow>▲</>");

/// Hint symbol (dim ↳)
pub const HINT_SYMBOL: &str = cstr!("<dim>↳</>");

/// Info symbol (dim ○)
pub const INFO_SYMBOL: &str = cstr!("<dim>○</>");

/// Prompt symbol (cyan ❯)
pub const PROMPT_SYMBOL: &str = cstr!("<cyan>❯</>");

/// A message that has already been formatted with a symbol and styling.
///
/// Message functions take `impl AsRef<str>` and return `FormattedMessage`.
/// `FormattedMessage` does not implement `AsRef<str>`, so formatting a message
/// twice is a compile error.
///
/// ```compile_fail
/// use wtpr::styling::error_message;
///
/// let msg = error_message("first error");
/// let double = error_message(msg);
/// ```
#[derive(Debug, Clone)]
pub struct FormattedMessage(String);

impl FormattedMessage {
    /// Wrap a string that is already styled (used by `GitError`'s Display).
    pub fn new(content: String) -> Self {
        Self(content)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormattedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<FormattedMessage> for String {
    fn from(msg: FormattedMessage) -> String {
        msg.0
    }
}

/// Format an error message with symbol and red styling
///
/// ```
/// use color_print::cformat;
/// use wtpr::styling::error_message;
///
/// let name = "feature";
/// println!("{}", error_message(cformat!("Branch <bold>{name}</> not found")));
/// ```
pub fn error_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{ERROR_SYMBOL} <red>{}</>", content.as_ref()))
}

/// Format a hint message with symbol and dim styling
pub fn hint_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{HINT_SYMBOL} <dim>{}</>", content.as_ref()))
}

/// Format a warning message with symbol and yellow styling
pub fn warning_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{WARNING_SYMBOL} <yellow>{}</>", content.as_ref()))
}

/// Format a success message with symbol and green styling
pub fn success_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{SUCCESS_SYMBOL} <green>{}</>", content.as_ref()))
}

/// Format a progress message with symbol and cyan styling
pub fn progress_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{PROGRESS_SYMBOL} <cyan>{}</>", content.as_ref()))
}

/// Format an info message with symbol (no color on text - neutral status)
pub fn info_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(format!("{INFO_SYMBOL} {}", content.as_ref()))
}

/// Format a prompt line (cyan symbol, plain text)
pub fn prompt_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(format!("{PROMPT_SYMBOL} {}", content.as_ref()))
}

/// Format a section heading (cyan text, no symbol), with optional suffix info.
///
/// ```
/// use wtpr::styling::format_heading;
///
/// let h = format_heading("WORKTREES", Some("3 total"));
/// assert!(h.contains("WORKTREES"));
/// ```
pub fn format_heading(title: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(s) => cformat!("<cyan>{}</>  {}", title, s),
        None => cformat!("<cyan>{}</>", title),
    }
}

/// Indent each line of `content` under a dim gutter bar.
pub fn format_with_gutter(content: &str) -> String {
    content
        .lines()
        .map(|line| cformat!("<dim>│</> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Calculate visual width of a string, ignoring ANSI escape codes.
pub fn visual_width(s: &str) -> usize {
    use ansi_str::AnsiStr;
    use unicode_width::UnicodeWidthStr;
    s.ansi_strip().width()
}

/// Right-pad `s` with spaces to `width` visible columns.
pub fn pad_visible(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(visual_width(s));
    format!("{s}{}", " ".repeat(pad))
}

/// `count` followed by `noun`, with an `s` unless the count is one.
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
