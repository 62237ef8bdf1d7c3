//! Settings file parsing and discovery

use crate::config::schema::validate_settings;
use crate::config::types::FileSettings;
use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["lunr.yml", "lunr.yaml"];

/// Environment variable naming an explicit settings file
pub const CONFIG_ENV: &str = "LUNR_CONFIG";

/// Locate the settings file
///
/// `LUNR_CONFIG` wins; otherwise the current directory and its parents are
/// searched, then the per-user config directory. A missing file is not an
/// error, since every setting has an environment or default source.
pub fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    env::current_dir()
        .ok()
        .and_then(find_config_file_from)
        .or_else(|| user_config_dir().and_then(|dir| find_in_dir(&dir)))
}

/// Search a directory and its parents for a settings file
pub fn find_config_file_from(start_dir: PathBuf) -> Option<PathBuf> {
    let mut current_dir = start_dir;

    loop {
        if let Some(found) = find_in_dir(&current_dir) {
            return Some(found);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return None,
        }
    }
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Per-user config directory, e.g. `~/.config/lunrclient`
pub fn user_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("org", "lunr", "lunrclient").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Parse and validate a settings file
pub fn parse_settings_file(path: &Path) -> ConfigResult<FileSettings> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_settings(&contents)
}

/// Parse and validate settings from a string
pub fn parse_settings(yaml: &str) -> ConfigResult<FileSettings> {
    if yaml.trim().is_empty() {
        return Ok(FileSettings::default());
    }

    let settings: FileSettings = serde_yaml::from_str(yaml)?;
    validate_settings(&settings)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_simple_settings() {
        let settings = parse_settings("api_url: http://api:8080\nadmin: root\n").unwrap();
        assert_eq!(settings.api_url.as_deref(), Some("http://api:8080"));
        assert_eq!(settings.admin.as_deref(), Some("root"));
    }

    #[test]
    fn test_parse_empty_settings() {
        assert_eq!(parse_settings("\n").unwrap(), FileSettings::default());
    }

    #[test]
    fn test_parse_rejects_bad_url() {
        let result = parse_settings("storage_url: not a url\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_rejects_bad_yaml() {
        let result = parse_settings("timeout: [1, 2\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("lunr.yml");
        fs::write(&config_path, "admin: admin\n").unwrap();

        let found = find_config_file_from(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("lunr.yaml");
        let sub_dir = temp_dir.path().join("subdir");

        fs::create_dir(&sub_dir).unwrap();
        fs::write(&config_path, "admin: admin\n").unwrap();

        let found = find_config_file_from(sub_dir).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_yml_preferred_over_yaml() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("lunr.yaml"), "").unwrap();
        fs::write(temp_dir.path().join("lunr.yml"), "").unwrap();

        let found = find_config_file_from(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(found, temp_dir.path().join("lunr.yml"));
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = parse_settings_file(&temp_dir.path().join("missing.yml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
