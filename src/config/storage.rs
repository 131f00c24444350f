//! Locating and reading the configuration file.

use super::Config;
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "GH_CHERRY_PICK_CONFIG";

/// Directory name under the platform config directory.
const APP_DIR: &str = "gh-cherry-pick";

/// Filename for the configuration.
const CONFIG_FILE: &str = "config.toml";

/// Pick the config file from an explicit override or the config directory.
pub fn resolve_config_path(explicit: Option<OsString>, config_dir: Option<PathBuf>) -> Option<PathBuf> {
    explicit
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| config_dir.map(|dir| dir.join(APP_DIR).join(CONFIG_FILE)))
}

/// Path of the config file for this process.
pub fn config_path() -> Option<PathBuf> {
    resolve_config_path(std::env::var_os(CONFIG_ENV), dirs::config_dir())
}

/// Load the config for this process.
///
/// Returns defaults when there is no config directory or no file.
pub fn load_config() -> Result<Config> {
    config_path().map_or_else(|| Ok(Config::default()), |path| load_config_from(&path))
}

/// Load the config at `path`.
///
/// Returns defaults if the file doesn't exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}
