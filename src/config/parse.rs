//! Configuration file parsing and discovery

use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, RdispatchError};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["rdispatch.yml", "rdispatch.yaml"];

/// Find the configuration file by searching current and parent directories,
/// then the user configuration directory
pub fn find_config_file() -> ConfigResult<PathBuf> {
    let start_dir = env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?;

    match find_config_file_from(start_dir) {
        Ok(path) => Ok(path),
        Err(ConfigError::NotFound(searched)) => match user_config_dir() {
            Some(dir) => find_in_dir(&dir).ok_or_else(|| {
                ConfigError::NotFound(format!("{}, {}", searched, dir.display()))
            }),
            None => Err(ConfigError::NotFound(searched)),
        },
        Err(e) => Err(e),
    }
}

/// Find the configuration file starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                return Ok(config_path);
            }
        }

        // Try parent directory
        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Per-user configuration directory, e.g. `~/.config/rdispatch` on Linux
pub fn user_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rdispatch").map(|dirs| dirs.config_dir().to_path_buf())
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<Config, RdispatchError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e)))?;

    parse_config(&contents)
}

/// Parse configuration from a string
pub fn parse_config(yaml: &str) -> Result<Config, RdispatchError> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(yaml)?;
    Ok(config)
}

/// Load the configuration from an explicit path, or discover it.
///
/// A missing configuration file is not an error when discovering: the
/// defaults are used instead.
pub fn load_config(path: Option<&Path>) -> Result<(Config, Option<PathBuf>), RdispatchError> {
    if let Some(path) = path {
        let config = parse_config_file(path)?;
        return Ok((config, Some(path.to_path_buf())));
    }

    match find_config_file() {
        Ok(found) => {
            debug!(path = %found.display(), "using configuration file");
            let config = parse_config_file(&found)?;
            Ok((config, Some(found)))
        }
        Err(ConfigError::NotFound(searched)) => {
            debug!(%searched, "no configuration file, using defaults");
            Ok((Config::default(), None))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ParseFailurePolicy;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
dispatcher:
  prefixes: ["/", "."]
  strict-arity: true
  on-parse-failure: skip
console:
  prompt: "$ "
  permissions:
    - "region.*"
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.dispatcher.prefixes, vec!['/', '.']);
        assert!(config.dispatcher.strict_arity);
        assert_eq!(config.dispatcher.on_parse_failure, ParseFailurePolicy::Skip);
        assert_eq!(config.console.prompt, "$ ");
        assert_eq!(config.console.permissions, vec!["region.*"]);
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let yaml = r#"
dispatcher:
  strict-arity: true
"#;
        let config = parse_config(yaml).unwrap();
        assert!(config.dispatcher.strict_arity);
        assert_eq!(config.dispatcher.prefixes, vec!['/', '!', '@']);
        assert_eq!(config.dispatcher.on_parse_failure, ParseFailurePolicy::Invoke);
        assert_eq!(config.console.prompt, "> ");
    }

    #[test]
    fn test_parse_empty_config() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_invalid_policy() {
        let yaml = r#"
dispatcher:
  on-parse-failure: retry
"#;
        let result = parse_config(yaml);
        assert!(matches!(result, Err(RdispatchError::Yaml(_))));
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("rdispatch.yml");
        fs::write(&config_path, "dispatcher:\n  strict-arity: true\n").unwrap();

        let found = find_config_file_from(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("rdispatch.yaml");
        let sub_dir = temp_dir.path().join("subdir");

        fs::create_dir(&sub_dir).unwrap();
        fs::write(&config_path, "console:\n  prompt: \"# \"\n").unwrap();

        let found = find_config_file_from(sub_dir).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.yml");
        fs::write(&config_path, "dispatcher:\n  prefixes: []\n").unwrap();

        let (config, path) = load_config(Some(&config_path)).unwrap();
        assert!(config.dispatcher.prefixes.is_empty());
        assert_eq!(path, Some(config_path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_config(Some(&temp_dir.path().join("missing.yml")));
        assert!(matches!(result, Err(RdispatchError::Config(ConfigError::Invalid(_)))));
    }
}
