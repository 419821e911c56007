//! Environment file loading
//!
//! Reads the local, untracked `.env` file holding build credentials. A missing
//! file is not an error: it yields an empty mapping so the resource keeps its
//! placeholders.
//!
//! Values are taken literally. `dotenvy` handles quoting and comments on plain
//! lines, but a value containing `$` or `\` is used exactly as written, so
//! secrets are never expanded or unescaped. Lines that are not `KEY=VALUE`
//! are skipped and recorded.

use envinject_core::error::{Error, Result, ResultExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Key/value pairs read from an env file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvProperties {
    values: HashMap<String, String>,
    source: Option<PathBuf>,
    skipped: Vec<usize>,
}

enum Line {
    Blank,
    Pair(String, String),
    Malformed,
}

impl EnvProperties {
    /// Load `path`, or return an empty mapping when it does not exist
    ///
    /// Only an unreadable file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "env file not found, using empty mapping");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(Error::from)
            .context(format!("Failed to read env file {}", path.display()))?;

        let mut props = Self::parse(&content);
        for line in &props.skipped {
            tracing::warn!(path = %path.display(), line, "skipping malformed env line");
        }
        tracing::debug!(path = %path.display(), keys = props.len(), "loaded env file");

        props.source = Some(path.to_path_buf());
        Ok(props)
    }

    /// Parse env file text; later definitions of a key win
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut values = HashMap::new();
        let mut skipped = Vec::new();

        for (index, line) in content.lines().enumerate() {
            match parse_line(line) {
                Line::Blank => {}
                Line::Pair(key, value) => {
                    values.insert(key, value);
                }
                Line::Malformed => skipped.push(index + 1),
            }
        }

        Self {
            values,
            source: None,
            skipped,
        }
    }

    /// Value for `key`, if defined
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for `key`, or `default` when the key is not defined
    ///
    /// A key defined with an empty value is returned as the empty string.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Whether `key` is defined
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The file these properties were read from; `None` if it was missing
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 1-based numbers of lines that were skipped as malformed
    #[must_use]
    pub fn skipped_lines(&self) -> &[usize] {
        &self.skipped
    }

    /// Number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no keys are defined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvProperties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            source: None,
            skipped: Vec::new(),
        }
    }
}

fn parse_line(line: &str) -> Line {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Line::Blank;
    }

    let Some((key, raw)) = split_assignment(trimmed) else {
        return Line::Malformed;
    };

    // dotenvy would substitute `$VAR` and consume backslashes
    if raw.contains(['$', '\\']) {
        return Line::Pair(key.to_string(), unquote(raw).to_string());
    }

    match dotenvy::from_read_iter(trimmed.as_bytes()).next() {
        Some(Ok((key, value))) => Line::Pair(key, value),
        _ => Line::Malformed,
    }
}

fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    valid.then(|| (key, value.trim()))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
