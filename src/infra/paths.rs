// src/infra/paths.rs — Config and data file locations
//
// BOOOMERANGS_HOME, when set, holds both the config file and the session
// database. Otherwise both live in the working directory.

use std::path::PathBuf;

pub const HOME_ENV: &str = "BOOOMERANGS_HOME";
pub const CONFIG_FILE: &str = "booomerangs.toml";

fn booomerangs_home() -> Option<PathBuf> {
    std::env::var_os(HOME_ENV).map(PathBuf::from)
}

/// Base directory for config and data.
pub fn base_dir() -> PathBuf {
    booomerangs_home().unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_file_path() -> PathBuf {
    base_dir().join(CONFIG_FILE)
}

/// Resolve a configured data path: absolute paths are kept, relative ones
/// are placed under the base directory.
pub fn resolve_data_path(configured: &str) -> PathBuf {
    let path = PathBuf::from(configured);
    if path.is_absolute() {
        path
    } else {
        base_dir().join(path)
    }
}
