//! Configuration and log file locations
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/login-harness/`
//! - macOS: `~/Library/Application Support/login-harness/`
//! - Windows: `%APPDATA%\login-harness\`

use std::path::PathBuf;

const APP_NAME: &str = "login-harness";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the log directory
pub fn log_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().join("logs"))
}

/// Default log file used when `--log-file` is given without a path
pub fn default_log_file() -> Option<PathBuf> {
    log_dir().map(|dir| dir.join("login-harness.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_ends_with_file_name() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_log_file_lives_in_log_dir() {
        if let (Some(dir), Some(file)) = (log_dir(), default_log_file()) {
            assert_eq!(file.parent(), Some(dir.as_path()));
        }
    }
}
