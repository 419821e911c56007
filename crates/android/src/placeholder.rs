//! Placeholder tokens and value resolution
//!
//! A placeholder pairs an env key with the marker string embedded in a
//! resource file. Resolution is an explicit default-value lookup: a key
//! missing from the env file resolves to its own token, so substitution
//! leaves the marker in place.

use crate::env_file::EnvProperties;
use envinject_core::config::{EscapeMode, PlaceholderConfig};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Anything shaped like `@UPPER_SNAKE@`
static PLACEHOLDER_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[A-Z][A-Z0-9_]*@").expect("placeholder regex is valid"));

/// A recognized placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    key: String,
    token: String,
}

impl Placeholder {
    /// Placeholder with token `@KEY@`
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let token = format!("@{key}@");
        Self { key, token }
    }

    /// Placeholder with an explicit token
    pub fn with_token(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
        }
    }

    /// Env key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Marker string in the resource
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Resolve against `env`, falling back to the token itself
    #[must_use]
    pub fn resolve<'a>(&'a self, env: &'a EnvProperties, escape: EscapeMode) -> Resolution<'a> {
        if env.contains_key(&self.key) {
            let raw = env.get_or(&self.key, &self.token);
            Resolution {
                value: escape_value(escape, raw),
                sourced: true,
            }
        } else {
            Resolution {
                value: Cow::Borrowed(&self.token),
                sourced: false,
            }
        }
    }
}

impl From<&PlaceholderConfig> for Placeholder {
    fn from(config: &PlaceholderConfig) -> Self {
        Self::with_token(config.key.clone(), config.token())
    }
}

/// Text a placeholder resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// Replacement text
    pub value: Cow<'a, str>,
    /// Whether the value came from the env file
    pub sourced: bool,
}

/// Ordered set of recognized placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSet {
    placeholders: Vec<Placeholder>,
}

impl PlaceholderSet {
    /// Build from configured placeholders, keeping their order
    #[must_use]
    pub fn from_config(configs: &[PlaceholderConfig]) -> Self {
        Self {
            placeholders: configs.iter().map(Placeholder::from).collect(),
        }
    }

    /// Iterate in substitution order
    pub fn iter(&self) -> std::slice::Iter<'_, Placeholder> {
        self.placeholders.iter()
    }

    /// Number of placeholders
    #[must_use]
    pub fn len(&self) -> usize {
        self.placeholders.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }

    /// Whether `token` is one of ours
    #[must_use]
    pub fn recognizes(&self, token: &str) -> bool {
        self.placeholders.iter().any(|p| p.token == token)
    }
}

impl Default for PlaceholderSet {
    /// The Naver login credentials
    fn default() -> Self {
        Self {
            placeholders: vec![
                Placeholder::new("NAVER_CLIENT_ID"),
                Placeholder::new("NAVER_CLIENT_SECRET"),
                Placeholder::new("NAVER_CLIENT_NAME"),
            ],
        }
    }
}

impl<'a> IntoIterator for &'a PlaceholderSet {
    type Item = &'a Placeholder;
    type IntoIter = std::slice::Iter<'a, Placeholder>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Escape `value` according to `mode`
#[must_use]
pub fn escape_value(mode: EscapeMode, value: &str) -> Cow<'_, str> {
    match mode {
        EscapeMode::None => Cow::Borrowed(value),
        EscapeMode::Android => Cow::Owned(escape_android(value)),
    }
}

/// Escape text for an Android `<string>` element body
fn escape_android(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    if value.starts_with(['@', '?']) {
        out.push('\\');
    }
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// Distinct placeholder-shaped tokens in `text`, in order of first appearance
#[must_use]
pub fn find_placeholder_shaped(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in PLACEHOLDER_SHAPE.find_iter(text) {
        if !found.iter().any(|f| f == m.as_str()) {
            found.push(m.as_str().to_string());
        }
    }
    found
}

/// Whether `text` contains anything shaped like a placeholder
#[must_use]
pub fn contains_placeholder_shape(text: &str) -> bool {
    PLACEHOLDER_SHAPE.is_match(text)
}
