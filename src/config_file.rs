//! Configuration file handling for shipit

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::Settings;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("Unable to find directory: {path:?} (entry: {entry:?})")]
    DirectoryNotFound {
        entry: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unknown working directory: {0}")]
    UnknownWorkingDirectory(String),
    #[error("Unable to parse YAML config file {path}: {source}")]
    Yaml {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("Unable to parse JSON config file {path}: {source}")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("Invalid config: {0}")]
    Validation(String),
}

/// Resolve `child` against `parent`: empty means `parent`, relative is joined,
/// absolute is kept.
#[must_use]
pub fn inherit_path(parent: &Path, child: PathBuf) -> PathBuf {
    if child.as_os_str().is_empty() {
        parent.to_path_buf()
    } else if child.is_relative() {
        parent.join(child)
    } else {
        child
    }
}

/// Root configuration structure. Every field falls back to a built-in default.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    pub shipit_version: Option<String>,
    pub deploy: Option<String>,
    pub remote: Option<String>,
    pub branch: Option<String>,
    pub cwd: Option<PathBuf>,
    pub env: Option<HashMap<String, String>>,
    pub timeout_secs: Option<u64>,
}

/// List of supported configuration file names
const FILENAMES: [&str; 3] = [".shipit.json", ".shipit.yaml", ".shipit.yml"];

impl Config {
    /// Loads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file cannot be read, or
    /// `ConfigError::Yaml`/`ConfigError::Json` if parsing fails.
    pub fn from_file(file: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(file)
            .map_err(|_| ConfigError::ConfigNotFound(file.to_path_buf()))?;
        let config: Config = if file.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&contents).map_err(|e| ConfigError::Json {
                source: e,
                path: file.to_path_buf(),
            })?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Yaml {
                source: e,
                path: file.to_path_buf(),
            })?
        };
        Ok(config)
    }

    /// Searches for a configuration file in `start` and its parents.
    #[must_use]
    pub fn find_config(start: &Path) -> Option<PathBuf> {
        let mut path = start.to_path_buf();
        debug!("Searching for config file in {}", start.display());
        loop {
            for file in &FILENAMES {
                let config_path = path.join(file);
                if config_path.exists() {
                    info!("Found config file: {}", config_path.display());
                    return Some(config_path);
                }
            }
            if !path.pop() {
                return None;
            }
        }
    }

    /// Convert into `Settings`, resolving `cwd` relative to `base` (the
    /// directory holding the config file).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DirectoryNotFound` if `cwd` does not exist.
    pub fn into_settings(self, base: &Path) -> Result<Settings, ConfigError> {
        let defaults = Settings::default();
        let cwd = self
            .cwd
            .map(|entry| {
                let path = inherit_path(base, entry.clone());
                path.canonicalize()
                    .map_err(|source| ConfigError::DirectoryNotFound {
                        entry: entry.to_string_lossy().into_owned(),
                        path,
                        source,
                    })
            })
            .transpose()?;
        Ok(Settings {
            deploy: self.deploy.unwrap_or(defaults.deploy),
            remote: self.remote.unwrap_or(defaults.remote),
            branch: self.branch.unwrap_or(defaults.branch),
            cwd,
            env: self.env.unwrap_or_default(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".shipit.json");
        std::fs::write(
            &path,
            r#"{
                "shipit_version": "0.1.0",
                "deploy": "make deploy",
                "branch": "release"
            }"#,
        )
        .unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.deploy.as_deref(), Some("make deploy"));
        assert_eq!(config.branch.as_deref(), Some("release"));
        assert_eq!(config.remote, None);
    }

    #[test]
    fn test_from_file_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".shipit.yaml");
        std::fs::write(
            &path,
            "remote: upstream\nenv:\n  CONVEX_DEPLOY_KEY: abc\ntimeout_secs: 90\n",
        )
        .unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.remote.as_deref(), Some("upstream"));
        assert_eq!(
            config.env.unwrap().get("CONVEX_DEPLOY_KEY").map(String::as_str),
            Some("abc")
        );
        assert_eq!(config.timeout_secs, Some(90));
    }

    #[test]
    fn test_from_file_yaml_error_has_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".shipit.yaml");
        std::fs::write(&path, "timeout_secs: [not, a, number]\n").unwrap();
        match Config::from_file(&path) {
            Err(ConfigError::Yaml { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected Yaml error, got: {other:?}"),
        }
    }

    #[test]
    fn test_into_settings_defaults() {
        let settings = Config::default().into_settings(Path::new(".")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_into_settings_resolves_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("app")).unwrap();
        let config = Config {
            cwd: Some(PathBuf::from("app")),
            ..Default::default()
        };
        let settings = config.into_settings(dir.path()).unwrap();
        assert_eq!(
            settings.cwd,
            Some(dir.path().join("app").canonicalize().unwrap())
        );
    }

    #[test]
    fn test_into_settings_missing_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            cwd: Some(PathBuf::from("missing")),
            ..Default::default()
        };
        match config.into_settings(dir.path()) {
            Err(ConfigError::DirectoryNotFound { entry, .. }) => assert_eq!(entry, "missing"),
            other => panic!("Expected DirectoryNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".shipit.yml"), "branch: main\n").unwrap();
        assert_eq!(
            Config::find_config(&nested),
            Some(dir.path().join(".shipit.yml"))
        );
    }

    #[test]
    fn test_find_config_prefers_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".shipit.yaml"), "").unwrap();
        std::fs::write(dir.path().join(".shipit.json"), "{}").unwrap();
        assert_eq!(
            Config::find_config(dir.path()),
            Some(dir.path().join(".shipit.json"))
        );
    }

    #[test]
    fn test_inherit_path() {
        let parent = Path::new("/repo");
        assert_eq!(inherit_path(parent, PathBuf::new()), PathBuf::from("/repo"));
        assert_eq!(
            inherit_path(parent, PathBuf::from("app")),
            PathBuf::from("/repo/app")
        );
        assert_eq!(
            inherit_path(parent, PathBuf::from("/abs")),
            PathBuf::from("/abs")
        );
    }
}
