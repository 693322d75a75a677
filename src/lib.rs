//! Core implementation of shipit
//!
//! shipit deploys the backend, stages and commits local changes, and pushes them
//! to a remote branch. The four steps run one after another and the run stops at
//! the first step that fails. Steps that already ran are not undone.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config_file::{Config, ConfigError};
use crate::settings::Settings;

pub mod commands;
pub mod config_file;
pub mod deploy;
pub mod logger;
pub mod message;
pub mod prompt;
pub mod runner;
pub mod settings;
mod style;

/// Load configuration from a file (or auto-detect), returning the settings
/// and the config file path if one was used. Without a config file the
/// built-in defaults apply.
///
/// # Errors
///
/// Returns `ConfigError` if an explicitly named config file does not exist,
/// a config file cannot be parsed, or it contains invalid values.
pub fn load_config(config_file: Option<&str>) -> Result<(Settings, Option<PathBuf>), ConfigError> {
    let config_path = match config_file {
        Some(file) => {
            let config_path = PathBuf::from(file);
            if !config_path.exists() {
                return Err(ConfigError::ConfigNotFound(config_path));
            }
            Some(config_path)
        }
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| ConfigError::UnknownWorkingDirectory(e.to_string()))?;
            Config::find_config(&cwd)
        }
    };

    let Some(config_path) = config_path else {
        debug!("No config file found, using defaults");
        return Ok((Settings::default(), None));
    };

    let base = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    debug!(
        "Loading config file: {} (base: {})",
        config_path.display(),
        base.display()
    );
    let parsed = Config::from_file(&config_path)?;
    if let Some(version) = &parsed.shipit_version {
        validate_version(version);
    }
    let settings = parsed.into_settings(&base)?;
    validate_settings(&settings)?;
    Ok((settings, Some(config_path)))
}

/// Warn if the config's `shipit_version` doesn't match the binary version
fn validate_version(config_version: &str) {
    let binary_version = env!("CARGO_PKG_VERSION");
    if config_version != binary_version {
        warn!(
            "Config shipit_version '{config_version}' differs from binary version '{binary_version}'"
        );
    }
}

fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.deploy.trim().is_empty() {
        return Err(ConfigError::Validation(
            "deploy has an empty command string".to_string(),
        ));
    }
    check_git_name("remote", &settings.remote)?;
    check_git_name("branch", &settings.branch)?;
    if settings.timeout.is_some_and(|t| t.is_zero()) {
        return Err(ConfigError::Validation(
            "timeout_secs must be greater than zero".to_string(),
        ));
    }
    if let Some(cwd) = &settings.cwd {
        check_directory(cwd)?;
    }
    Ok(())
}

fn check_git_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} is empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{field} '{value}' contains whitespace"
        )));
    }
    Ok(())
}

fn check_directory(path: &Path) -> Result<(), ConfigError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "cwd '{}' is not a directory",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_settings_pass() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_empty_deploy_rejected() {
        let settings = Settings {
            deploy: "  ".to_string(),
            ..Default::default()
        };
        match validate_settings(&settings) {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("empty command"), "got: {msg}"),
            other => panic!("Expected Validation error, got: {other:?}"),
        }
    }

    #[test]
    fn test_branch_with_whitespace_rejected() {
        let settings = Settings {
            branch: "main --force".to_string(),
            ..Default::default()
        };
        match validate_settings(&settings) {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("branch"), "got: {msg}"),
            other => panic!("Expected Validation error, got: {other:?}"),
        }
    }

    #[test]
    fn test_empty_remote_rejected() {
        let settings = Settings {
            remote: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let settings = Settings {
            timeout: Some(Duration::ZERO),
            ..Default::default()
        };
        match validate_settings(&settings) {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("timeout"), "got: {msg}"),
            other => panic!("Expected Validation error, got: {other:?}"),
        }
    }

    #[test]
    fn test_cwd_must_be_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "").unwrap();
        let settings = Settings {
            cwd: Some(file),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(ConfigError::Validation(_))
        ));
    }
}
