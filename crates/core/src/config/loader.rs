//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Config file names searched in the project directory, in order
pub const CONFIG_CANDIDATES: &[&str] = &[
    ".envinject.toml",
    "envinject.toml",
    ".config/envinject.toml",
];

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed and validated schema
    pub schema: ConfigSchema,
    /// File the schema was read from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, a standard location in
    /// `project_dir`, or fall back to defaults
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(project_dir),
        };

        let schema = match &config_path {
            Some(p) => load_config_file(p)?,
            None => {
                tracing::debug!(dir = %project_dir.display(), "no config file, using defaults");
                ConfigSchema::default()
            }
        };

        schema.validate()?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file(project_dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| project_dir.join(candidate))
        .find(|path| path.is_file())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    tracing::debug!(path = %path.display(), "loading config");

    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))
}
