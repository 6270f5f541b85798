//! Share untracked files (`.env`, local settings) between worktrees.
//!
//! Entries from the `link` config are linked from the main worktree into a
//! target worktree, either as symlinks or as copies (copy-on-write when the
//! filesystem supports it).

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::git::GitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkMode {
    #[default]
    Symlink,
    Copy,
}

/// What happened to one configured entry.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LinkOutcome {
    Linked,
    Copied,
    /// Target already exists and `force` was not given.
    Exists,
    /// Nothing to link in the source worktree.
    MissingSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResult {
    pub entry: String,
    pub target: PathBuf,
    pub outcome: LinkOutcome,
}

/// Link each of `entries` (relative to `source_root`) into `dest_root`.
///
/// Existing targets are left alone unless `force`, in which case they are
/// replaced. Entries must stay inside the worktree.
pub fn link_entries(
    source_root: &Path,
    dest_root: &Path,
    entries: &[String],
    mode: LinkMode,
    force: bool,
) -> anyhow::Result<Vec<LinkResult>> {
    entries
        .iter()
        .map(|entry| {
            let relative = checked_relative(entry)?;
            let source = source_root.join(&relative);
            let target = dest_root.join(&relative);
            let outcome = link_one(&source, &target, mode, force)?;
            log::debug!("link {entry}: {outcome}");
            Ok(LinkResult {
                entry: entry.clone(),
                target,
                outcome,
            })
        })
        .collect()
}

fn checked_relative(entry: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(entry.trim_end_matches('/'));
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if path.as_os_str().is_empty() || escapes {
        return Err(GitError::ParseError(format!(
            "link entry {entry:?} must be a path inside the repository"
        ))
        .into());
    }
    Ok(path.to_path_buf())
}

fn link_one(source: &Path, target: &Path, mode: LinkMode, force: bool) -> anyhow::Result<LinkOutcome> {
    let Ok(source_meta) = fs::metadata(source) else {
        log::warn!("Nothing to link at {}", source.display());
        return Ok(LinkOutcome::MissingSource);
    };

    if let Ok(existing) = fs::symlink_metadata(target) {
        if !force {
            return Ok(LinkOutcome::Exists);
        }
        if existing.is_dir() {
            fs::remove_dir_all(target)?;
        } else {
            fs::remove_file(target)?;
        }
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    match mode {
        LinkMode::Symlink => {
            symlink(source, target, source_meta.is_dir())?;
            Ok(LinkOutcome::Linked)
        }
        LinkMode::Copy => {
            if source_meta.is_dir() {
                copy_dir_recursive(source, target)?;
            } else {
                reflink_copy::reflink_or_copy(source, target)?;
            }
            Ok(LinkOutcome::Copied)
        }
    }
}

#[cfg(unix)]
fn symlink(source: &Path, target: &Path, _is_dir: bool) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn symlink(source: &Path, target: &Path, is_dir: bool) -> std::io::Result<()> {
    if is_dir {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    }
}

/// Copy a directory using reflink for each file, skipping `.git` and symlinks.
fn copy_dir_recursive(src: &Path, dest: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dest)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let file_name = entry.file_name();
        if file_name == ".git" || file_type.is_symlink() {
            continue;
        }

        let src_path = entry.path();
        let dest_path = dest.join(file_name);
        if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dest_path)?;
        } else {
            match reflink_copy::reflink_or_copy(&src_path, &dest_path) {
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
