//! Serializable screening configuration.
//!
//! Loaded from an optional TOML file. Every table and field has a default,
//! so an empty file (or no file at all) is a valid configuration:
//!
//! ```toml
//! [model]
//! model = "moonshotai/kimi-k2-instruct"
//! timeout_secs = 30
//!
//! [screen]
//! parallel = true
//! ```

use screenlab_core::compiler::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level configuration: the language-model endpoint and driver options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub model: ModelConfig,
    pub screen: ScreenSettings,
}

/// Driver options (`[screen]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSettings {
    /// Fan symbol evaluation out across the rayon pool.
    pub parallel: bool,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl ScreenConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path` when given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_all_defaults() {
        let config = ScreenConfig::from_toml("").unwrap();
        assert_eq!(config, ScreenConfig::default());
        assert!(config.screen.parallel);
        assert_eq!(config.model.max_tokens, 200);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = ScreenConfig::from_toml(
            r#"
            [model]
            timeout_secs = 5
            max_retries = 0

            [screen]
            parallel = false
            "#,
        )
        .unwrap();
        assert_eq!(config.model.timeout_secs, 5);
        assert_eq!(config.model.max_retries, 0);
        assert_eq!(config.model.connect_timeout_secs, 10);
        assert_eq!(config.model.api_key_env, "NOVITA_API_KEY");
        assert!(!config.screen.parallel);
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = ScreenConfig::default();
        config.model.base_url = "http://localhost:8080/v1".into();
        config.screen.parallel = false;
        let text = config.to_toml().unwrap();
        assert_eq!(ScreenConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn rejects_wrong_types() {
        let err = ScreenConfig::from_toml("[screen]\nparallel = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ScreenConfig::from_file(Path::new("/nonexistent/screenlab.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/screenlab.toml"));
    }

    #[test]
    fn load_without_path_is_default() {
        assert_eq!(ScreenConfig::load(None).unwrap(), ScreenConfig::default());
    }
}
