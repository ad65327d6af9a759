//! Repository configuration files
//!
//! A TOML file names the template directory and file extension, so tools
//! can point at a project's templates without repeating flags:
//!
//! ```toml
//! [templates]
//! root = "templates"
//! extension = "mustache"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::repository::directory::DEFAULT_EXTENSION;
use crate::Repository;

/// Errors that can occur when loading or parsing a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Where a directory-backed repository finds its templates
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Directory holding the template files
    pub root: PathBuf,
    /// Template file extension
    pub extension: String,
}

/// TOML structure for deserializing configuration files
#[derive(Deserialize)]
struct TomlConfig {
    templates: TomlTemplates,
}

#[derive(Deserialize)]
struct TomlTemplates {
    root: PathBuf,
    extension: Option<String>,
}

impl RepositoryConfig {
    /// Load configuration from a TOML file. A relative `root` is taken
    /// relative to the configuration file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        if config.root.is_relative() {
            if let Some(dir) = path.parent() {
                config.root = dir.join(&config.root);
            }
        }
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;

        Ok(RepositoryConfig {
            root: parsed.templates.root,
            extension: parsed
                .templates
                .extension
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        })
    }

    /// Build a repository over the configured directory
    pub fn into_repository(self) -> Repository {
        Repository::from_directory_with_extension(self.root, self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = RepositoryConfig::from_str(
            r#"
[templates]
root = "site/templates"
extension = "txt"
"#,
        )
        .expect("Should parse");
        assert_eq!(config.root, PathBuf::from("site/templates"));
        assert_eq!(config.extension, "txt");
    }

    #[test]
    fn test_extension_defaults_to_mustache() {
        let config = RepositoryConfig::from_str(
            r#"
[templates]
root = "templates"
"#,
        )
        .expect("Should parse");
        assert_eq!(config.extension, "mustache");
    }

    #[test]
    fn test_missing_templates_table_errors() {
        let result = RepositoryConfig::from_str("[other]\nkey = 1\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_toml_errors() {
        let result = RepositoryConfig::from_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
