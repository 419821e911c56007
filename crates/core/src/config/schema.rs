//! Configuration schema definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    /// Environment file settings
    #[serde(default)]
    pub env: EnvConfig,

    /// Resource document settings
    #[serde(default)]
    pub resource: ResourceConfig,

    /// Recognized placeholders, in substitution order
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<PlaceholderConfig>,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
}

impl Default for ConfigSchema {
    fn default() -> Self {
        Self {
            env: EnvConfig::default(),
            resource: ResourceConfig::default(),
            placeholders: default_placeholders(),
            build: BuildConfig::default(),
        }
    }
}

impl ConfigSchema {
    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.placeholders.is_empty() {
            return Err(Error::config_invalid("At least one placeholder must be configured"));
        }

        let mut keys = HashSet::new();
        let mut tokens = HashSet::new();
        for placeholder in &self.placeholders {
            if placeholder.key.trim().is_empty() {
                return Err(Error::config_invalid("Placeholder key must not be empty"));
            }
            if !keys.insert(placeholder.key.as_str()) {
                return Err(Error::config_invalid(format!(
                    "Duplicate placeholder key: {}",
                    placeholder.key
                )));
            }

            let token = placeholder.token();
            if token.is_empty() {
                return Err(Error::config_invalid(format!(
                    "Placeholder token for {} must not be empty",
                    placeholder.key
                )));
            }
            if !tokens.insert(token.clone()) {
                return Err(Error::config_invalid(format!("Duplicate placeholder token: {token}")));
            }
        }

        if self.build.task.trim().is_empty() {
            return Err(Error::config_invalid("Build task must not be empty"));
        }

        Ok(())
    }
}

/// Environment file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Path of the env file, relative to the project directory
    #[serde(default = "default_env_path")]
    pub path: PathBuf,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            path: default_env_path(),
        }
    }
}

fn default_env_path() -> PathBuf {
    PathBuf::from("../.env")
}

/// Resource document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Path of the generated resource, relative to the project directory
    #[serde(default = "default_resource_path")]
    pub path: PathBuf,

    /// Canonical template kept apart from the generated resource
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// How values are escaped before substitution
    #[serde(default)]
    pub escape: EscapeMode,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            path: default_resource_path(),
            template: None,
            escape: EscapeMode::default(),
        }
    }
}

fn default_resource_path() -> PathBuf {
    PathBuf::from("app/src/main/res/values/strings.xml")
}

/// Value escaping applied before substitution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    /// Raw textual substitution
    #[default]
    None,
    /// Escape for an Android `<string>` resource
    Android,
}

/// A recognized placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderConfig {
    /// Key looked up in the env file
    pub key: String,

    /// Marker in the resource; `@KEY@` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl PlaceholderConfig {
    /// Placeholder whose token is derived from the key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: None,
        }
    }

    /// The marker string for this placeholder
    #[must_use]
    pub fn token(&self) -> String {
        self.token
            .clone()
            .unwrap_or_else(|| format!("@{}@", self.key))
    }
}

fn default_placeholders() -> Vec<PlaceholderConfig> {
    ["NAVER_CLIENT_ID", "NAVER_CLIENT_SECRET", "NAVER_CLIENT_NAME"]
        .into_iter()
        .map(PlaceholderConfig::new)
        .collect()
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Gradle task run after the pre-build steps
    #[serde(default = "default_task")]
    pub task: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            task: default_task(),
        }
    }
}

fn default_task() -> String {
    "assembleDebug".to_string()
}
