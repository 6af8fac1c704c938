use crate::constants::APP_NAME;
use std::path::PathBuf;

/// Expand a leading `~` to the user's home directory.
///
/// Returns `None` when the path starts with `~` but the home directory
/// cannot be determined (e.g. sandboxed environments). Non-tilde paths
/// are always returned as-is.
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    if path == "~" {
        dirs::home_dir()
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir().map(|home| home.join(rest))
    } else {
        Some(PathBuf::from(path))
    }
}

/// Configuration directory, honouring `XDG_CONFIG_HOME`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config_home.is_empty()
    {
        return PathBuf::from(xdg_config_home).join(APP_NAME);
    }
    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_NAME}")))
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Data directory holding agent credentials shared read-only with sessions.
pub fn auth_dir() -> PathBuf {
    if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME")
        && !xdg_data_home.is_empty()
    {
        return PathBuf::from(xdg_data_home).join(APP_NAME).join("auth");
    }
    dirs::home_dir()
        .map(|home| home.join(".local").join("share").join(APP_NAME).join("auth"))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_NAME}-auth")))
}

pub fn credentials_file() -> PathBuf {
    auth_dir().join(".credentials.json")
}

/// Cache directory, used for the rotating log files.
pub fn cache_dir() -> PathBuf {
    if let Ok(xdg_cache_home) = std::env::var("XDG_CACHE_HOME")
        && !xdg_cache_home.is_empty()
    {
        return PathBuf::from(xdg_cache_home).join(APP_NAME);
    }
    dirs::home_dir()
        .map(|home| home.join(".cache").join(APP_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join(APP_NAME))
}

pub fn log_file() -> PathBuf {
    cache_dir().join(format!("{APP_NAME}.log"))
}

/// State directory for runtime artefacts (daemon pid file).
pub fn state_dir() -> PathBuf {
    if let Ok(xdg_state_home) = std::env::var("XDG_STATE_HOME")
        && !xdg_state_home.is_empty()
    {
        return PathBuf::from(xdg_state_home).join(APP_NAME);
    }
    dirs::home_dir()
        .map(|home| home.join(".local").join("state").join(APP_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_unchanged() {
        assert_eq!(
            expand_tilde("/absolute/path"),
            Some(PathBuf::from("/absolute/path"))
        );
    }

    #[test]
    fn relative_path_unchanged() {
        assert_eq!(expand_tilde("relative"), Some(PathBuf::from("relative")));
    }

    #[test]
    fn tilde_alone_expands_to_home() {
        let result = expand_tilde("~").expect("home dir should exist in test env");
        assert!(!result.to_string_lossy().contains('~'));
    }

    #[test]
    fn tilde_with_rest_expands() {
        let result = expand_tilde("~/test").expect("home dir should exist in test env");
        assert!(result.to_string_lossy().ends_with("test"));
        assert!(!result.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn tilde_in_middle_not_expanded() {
        assert_eq!(
            expand_tilde("/some/~/path"),
            Some(PathBuf::from("/some/~/path"))
        );
    }

    #[test]
    fn config_dir_respects_xdg_override() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("custom-config");

        unsafe { std::env::set_var("XDG_CONFIG_HOME", &custom) };
        let result = config_dir();
        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };

        assert_eq!(result, custom.join(APP_NAME));
    }

    #[test]
    fn config_file_lives_under_config_dir() {
        let path = config_file();
        assert_eq!(path.file_name().unwrap(), "config.toml");
        assert!(path.parent().unwrap().ends_with(APP_NAME));
    }

    #[test]
    fn auth_dir_ends_with_auth() {
        assert!(auth_dir().ends_with("auth"));
    }

    #[test]
    fn cache_dir_respects_xdg_override() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("custom-cache");

        unsafe { std::env::set_var("XDG_CACHE_HOME", &custom) };
        let result = cache_dir();
        unsafe { std::env::remove_var("XDG_CACHE_HOME") };

        assert_eq!(result, custom.join(APP_NAME));
    }

    #[test]
    fn log_file_named_after_app() {
        let path = log_file();
        assert_eq!(path.file_name().unwrap(), "bosun.log");
    }
}
