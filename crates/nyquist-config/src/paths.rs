//! Platform-specific configuration paths.
//!
//! - **User config**: `~/.config/nyquist/` (Linux), `~/Library/Application Support/nyquist/` (macOS), `%APPDATA%\nyquist\` (Windows)
//! - **Config file**: `config.toml` inside the user config directory
//!
//! # Example
//!
//! ```rust,no_run
//! use nyquist_config::paths;
//!
//! let path = paths::default_config_path();
//! println!("Config file: {:?}", path);
//! ```

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "nyquist";

/// File name of the service configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path (`./nyquist`) if the config directory cannot be
/// determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path the service reads its configuration from by default.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_ends_with_app_name() {
        assert!(user_config_dir().ends_with(APP_NAME));
    }

    #[test]
    fn default_config_path_is_toml_in_config_dir() {
        let path = default_config_path();
        assert_eq!(path.file_name().unwrap(), CONFIG_FILE_NAME);
        assert_eq!(path.parent().unwrap(), user_config_dir());
    }
}
