use std::path::{Path, PathBuf};

/// `.config/wtpr.toml` in the repository root.
pub fn project_config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(".config").join("wtpr.toml")
}
