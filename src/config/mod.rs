//! Configuration loading
//!
//! Reads an optional YAML config file from the platform config directory
//! (e.g. `~/.config/k8s-diagram/config.yaml` on Linux). Missing file means
//! defaults; CLI flags override whatever the file provides.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Persistent tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Namespace allow-list; wins over the deny-list when both are set
    pub included_namespaces: Vec<String>,
    /// Namespace deny-list
    pub excluded_namespaces: Vec<String>,
    /// Default output path; stdout when unset
    pub output: Option<PathBuf>,
}

/// Path of the user config file, if a config directory can be determined
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "k8s-diagram")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Load configuration, falling back to defaults when no file exists
///
/// A present-but-invalid file is an error rather than a silent default:
/// the user wrote it for a reason.
pub fn load() -> Result<Config> {
    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unfiltered_stdout() {
        let config = Config::default();
        assert!(config.included_namespaces.is_empty());
        assert!(config.excluded_namespaces.is_empty());
        assert!(config.output.is_none());
    }

    #[test]
    fn test_parse_camel_case_keys() {
        let yaml = "includedNamespaces:\n  - prod\noutput: cluster.mmd\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.included_namespaces, vec!["prod"]);
        assert_eq!(config.output, Some(PathBuf::from("cluster.mmd")));
        assert!(config.excluded_namespaces.is_empty());
    }

    #[test]
    fn test_empty_document_uses_field_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert!(config.included_namespaces.is_empty());
    }
}
