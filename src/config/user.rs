//! Location of the user config file.

use std::path::PathBuf;
use std::sync::OnceLock;

use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};

/// Override for the user config path, set via the `--config` flag
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

pub fn set_config_path(path: PathBuf) {
    CONFIG_PATH.set(path).ok();
}

/// Path of the user config file.
///
/// 1. `--config`
/// 2. `WTPR_CONFIG_PATH` (also used by tests to isolate themselves)
/// 3. `<config dir>/wtpr/config.toml`: XDG on Linux and macOS, `%APPDATA%` on Windows
pub fn get_config_path() -> Option<PathBuf> {
    if let Some(path) = CONFIG_PATH.get() {
        return Some(path.clone());
    }
    if let Ok(path) = std::env::var("WTPR_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("wtpr").join("config.toml"))
}
