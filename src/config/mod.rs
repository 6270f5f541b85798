//! Configuration for wtpr
//!
//! Two TOML files with the same keys, the project file overriding the user
//! file field by field:
//!
//! # User Config (~/.config/wtpr/config.toml)
//!
//! Personal defaults, not checked into git. Location can be overridden with
//! `--config` or `WTPR_CONFIG_PATH`.
//!
//! # Project Config (`<repo>`/.config/wtpr.toml)
//!
//! Checked into the repository and shared by everyone working on it.
//!
//! # Keys
//!
//! - `base-branch` - branch new PRs target
//! - `worktree-path` - template for new worktree paths, relative to the main worktree
//! - `link` - repo-relative files to link into new worktrees (`.env`, ...)
//! - `post-create` - commands run in a new worktree
//! - `draft` - open PRs as drafts

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use normalize_path::NormalizePath;
use serde::{Deserialize, Serialize};

mod expansion;
mod project;
mod user;

pub use expansion::{expand_template, sanitize_branch_name};
pub use project::project_config_path;
pub use user::{get_config_path, set_config_path};

use crate::git::{GitError, Repository};

pub const DEFAULT_WORKTREE_PATH: &str = "../{{ repo }}.{{ branch | sanitize }}";

/// Used when neither flag, config nor remote names a base branch.
pub const FALLBACK_BASE_BRANCH: &str = "main";

/// One or more shell commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Commands {
    One(String),
    Many(Vec<String>),
}

impl Commands {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            Commands::One(cmd) => std::slice::from_ref(cmd),
            Commands::Many(cmds) => cmds.as_slice(),
        };
        slice.iter().map(String::as_str)
    }
}

/// A single config file as written on disk; every key optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    #[serde(default)]
    pub base_branch: Option<String>,
    #[serde(default)]
    pub worktree_path: Option<String>,
    #[serde(default)]
    pub link: Option<Vec<String>>,
    #[serde(default)]
    pub post_create: Option<Commands>,
    #[serde(default)]
    pub draft: Option<bool>,

    /// Captures unknown keys so they can be reported
    #[serde(flatten)]
    unknown: HashMap<String, toml::Value>,
}

impl ConfigFile {
    /// Parse TOML contents. `path` only names the file in errors and warnings.
    pub fn parse(contents: &str, path: &Path) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| {
            GitError::ParseError(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        for key in file.unknown_keys() {
            log::warn!("Ignoring unknown key {key:?} in {}", path.display());
        }
        Ok(file)
    }

    /// Load from `path`; a missing file is an empty layer.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                log::debug!("Loaded config from {}", path.display());
                Self::parse(&contents, path)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(GitError::ParseError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
            .into()),
        }
    }

    /// Names of keys that will be ignored.
    pub fn unknown_keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.unknown.keys().map(String::as_str).collect();
        keys.sort();
        keys
    }

    /// Overlay `other` on top of `self`, field by field.
    fn merge(self, other: ConfigFile) -> ConfigFile {
        ConfigFile {
            base_branch: other.base_branch.or(self.base_branch),
            worktree_path: other.worktree_path.or(self.worktree_path),
            link: other.link.or(self.link),
            post_create: other.post_create.or(self.post_create),
            draft: other.draft.or(self.draft),
            unknown: HashMap::new(),
        }
    }
}

/// Effective configuration after layering and defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub base_branch: Option<String>,
    pub worktree_path: String,
    pub link: Vec<String>,
    pub post_create: Vec<String>,
    pub draft: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_layers(ConfigFile::default(), ConfigFile::default())
    }
}

impl Config {
    /// Layer the project file over the user file and fill in defaults.
    pub fn from_layers(user: ConfigFile, project: ConfigFile) -> Self {
        let merged = user.merge(project);
        Config {
            base_branch: merged.base_branch.filter(|b| !b.trim().is_empty()),
            worktree_path: merged
                .worktree_path
                .unwrap_or_else(|| DEFAULT_WORKTREE_PATH.to_string()),
            link: merged.link.unwrap_or_default(),
            post_create: merged
                .post_create
                .map(|c| c.iter().map(str::to_string).collect())
                .unwrap_or_default(),
            draft: merged.draft.unwrap_or(false),
        }
    }

    /// Load the user config and, when `repo_root` is given, the project config.
    pub fn load(repo_root: Option<&Path>) -> anyhow::Result<Self> {
        let user = match get_config_path() {
            Some(path) => ConfigFile::load(&path)?,
            None => ConfigFile::default(),
        };
        let project = match repo_root {
            Some(root) => ConfigFile::load(&project_config_path(root))?,
            None => ConfigFile::default(),
        };
        Ok(Self::from_layers(user, project))
    }

    /// Pick the base branch: `--base`, then config, then the remote's default, then `main`.
    pub fn resolve_base_branch(
        &self,
        cli_base: Option<&str>,
        repo: &Repository,
    ) -> anyhow::Result<String> {
        if let Some(base) = cli_base {
            return Ok(base.to_string());
        }
        if let Some(base) = &self.base_branch {
            return Ok(base.clone());
        }
        if let Some(base) = repo.default_branch()? {
            log::debug!("Using remote default branch {base} as base");
            return Ok(base);
        }
        Ok(FALLBACK_BASE_BRANCH.to_string())
    }

    /// Where a new worktree for `branch` goes. Relative templates resolve
    /// against the main worktree root.
    pub fn worktree_path_for(
        &self,
        main_root: &Path,
        repo_name: &str,
        branch: &str,
    ) -> anyhow::Result<PathBuf> {
        let vars = BTreeMap::from([("repo", repo_name), ("branch", branch)]);
        let expanded = expand_template(&self.worktree_path, &vars, false, "worktree-path")?;
        let expanded = expanded.trim();
        if expanded.is_empty() {
            return Err(GitError::ParseError("worktree-path expanded to an empty path".into()).into());
        }
        Ok(main_root.join(expanded).normalize())
    }

    /// Expand each `post-create` command with shell-escaped values.
    pub fn post_create_commands(&self, vars: &BTreeMap<&str, &str>) -> anyhow::Result<Vec<String>> {
        self.post_create
            .iter()
            .map(|cmd| expand_template(cmd, vars, true, "post-create"))
            .collect()
    }
}
