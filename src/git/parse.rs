//! Git output parsing functions

use std::path::PathBuf;

use super::{GitError, Worktree};

impl Worktree {
    pub(crate) fn parse_porcelain_list(output: &str) -> Result<Vec<Self>, GitError> {
        let mut worktrees = Vec::new();
        let mut current: Option<Worktree> = None;

        for line in output.lines() {
            if line.is_empty() {
                if let Some(wt) = current.take() {
                    worktrees.push(wt);
                }
                continue;
            }

            let (key, value) = match line.split_once(' ') {
                Some((k, v)) => (k, Some(v)),
                None => (line, None),
            };

            match key {
                "worktree" => {
                    let path = value.ok_or_else(|| {
                        GitError::ParseError("worktree line missing path".to_string())
                    })?;
                    if let Some(wt) = current.take() {
                        worktrees.push(wt);
                    }
                    current = Some(Worktree {
                        path: PathBuf::from(path),
                        head: String::new(),
                        branch: None,
                        bare: false,
                        detached: false,
                        locked: None,
                        prunable: None,
                    });
                }
                key => match (key, current.as_mut()) {
                    ("HEAD", Some(wt)) => {
                        wt.head = value
                            .ok_or_else(|| {
                                GitError::ParseError("HEAD line missing SHA".to_string())
                            })?
                            .to_string();
                    }
                    ("branch", Some(wt)) => {
                        let branch_ref = value.ok_or_else(|| {
                            GitError::ParseError("branch line missing ref".to_string())
                        })?;
                        let branch = branch_ref
                            .strip_prefix("refs/heads/")
                            .unwrap_or(branch_ref)
                            .to_string();
                        wt.branch = Some(branch);
                    }
                    ("bare", Some(wt)) => wt.bare = true,
                    ("detached", Some(wt)) => wt.detached = true,
                    ("locked", Some(wt)) => {
                        wt.locked = Some(value.unwrap_or_default().to_string());
                    }
                    ("prunable", Some(wt)) => {
                        wt.prunable = Some(value.unwrap_or_default().to_string());
                    }
                    // Unknown attributes, or attributes before the first worktree line
                    _ => {}
                },
            }
        }

        // Output may not end with a blank line
        if let Some(wt) = current {
            worktrees.push(wt);
        }

        Ok(worktrees)
    }
}

/// One entry of `git status --porcelain=v1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Index (staged) status column
    pub index: char,
    /// Worktree (unstaged) status column
    pub worktree: char,
    /// Path relative to the repository root; for renames, the new path
    pub path: String,
}

impl StatusEntry {
    pub fn is_untracked(&self) -> bool {
        self.index == '?' && self.worktree == '?'
    }

    pub fn is_staged(&self) -> bool {
        !matches!(self.index, ' ' | '?' | '!')
    }

    /// Modified in the worktree relative to the index, or untracked.
    pub fn is_unstaged(&self) -> bool {
        self.is_untracked() || !matches!(self.worktree, ' ' | '?' | '!')
    }

    pub(crate) fn parse_porcelain(output: &str) -> Result<Vec<Self>, GitError> {
        output
            .lines()
            .filter(|line| !line.is_empty())
            .map(Self::parse_line)
            .collect()
    }

    fn parse_line(line: &str) -> Result<Self, GitError> {
        let mut chars = line.chars();
        let (Some(index), Some(worktree), Some(' ')) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(GitError::ParseError(format!(
                "Malformed status line: {line:?}"
            )));
        };
        let rest = chars.as_str();
        let path = match rest.split_once(" -> ") {
            Some((_, new)) => new,
            None => rest,
        };
        if path.is_empty() {
            return Err(GitError::ParseError(format!(
                "Status line missing path: {line:?}"
            )));
        }
        Ok(Self {
            index,
            worktree,
            path: unquote_path(path),
        })
    }
}

/// Strip the C-style quoting git applies to paths with spaces or special characters.
fn unquote_path(path: &str) -> String {
    let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
        return path.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

pub(crate) fn parse_local_default_branch(output: &str, remote: &str) -> Result<String, GitError> {
    let trimmed = output.trim();
    let prefix = format!("{}/", remote);
    let branch = trimmed.strip_prefix(&prefix).unwrap_or(trimmed);

    if branch.is_empty() {
        return Err(GitError::ParseError(format!(
            "Empty branch name from {}/HEAD",
            remote
        )));
    }

    Ok(branch.to_string())
}

pub(crate) fn parse_remote_default_branch(output: &str) -> Result<String, GitError> {
    output
        .lines()
        .find_map(|line| {
            line.strip_prefix("ref: ")
                .and_then(|symref| symref.split_once('\t'))
                .map(|(ref_path, _)| ref_path)
                .and_then(|ref_path| ref_path.strip_prefix("refs/heads/"))
                .map(|branch| branch.to_string())
        })
        .ok_or_else(|| {
            GitError::ParseError("Could not find symbolic ref in ls-remote output".to_string())
        })
}
