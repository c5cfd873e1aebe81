//! Standard locations for Twindeck files

use std::path::PathBuf;

/// Directory holding the config file and the log
///
/// Returns: `{config_dir}/twindeck`, falling back to `~/.twindeck` and then
/// `./.twindeck` on systems without a config directory.
pub fn default_config_dir() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("twindeck"),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".twindeck"),
    }
}

/// Returns: `{config dir}/config.yaml`
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

/// Returns: `{config dir}/twindeck.log`
pub fn default_log_path() -> PathBuf {
    default_config_dir().join("twindeck.log")
}
