//! Error handling with context and recovery suggestions
//!
//! This module provides structured error types with:
//! - Detailed error context
//! - Recovery suggestions
//! - Error codes for programmatic handling
//! - Serializable error reports

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    Unknown = 1000,
    Internal = 1001,

    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,
    InvalidPath = 2003,
    ResourceNotFound = 2005,

    // Configuration errors (3xxx)
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    ConfigValidationError = 3003,

    // Process errors (5xxx)
    ProcessError = 5000,
    CommandNotFound = 5001,
    CommandFailed = 5002,

    // Validation errors (6xxx)
    ValidationError = 6000,
    PlaceholderRemaining = 6004,

    // Build errors (8xxx)
    PlatformError = 8000,
    GradleError = 8002,
    BuildStepFailed = 8005,
    DuplicateBuildStep = 8006,
}

impl ErrorCode {
    /// Get the numeric code
    #[must_use]
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            5 => "Process",
            6 => "Validation",
            8 => "Build",
            _ => "Unknown",
        }
    }

    /// CLI exit status for this code
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self.code() / 1000 {
            3 => exit_codes::CONFIG_ERROR,
            6 => exit_codes::VALIDATION_ERROR,
            _ if *self == ErrorCode::CommandNotFound => exit_codes::COMMAND_NOT_FOUND,
            _ => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {ctx}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    #[must_use]
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(ToString::to_string),
        }
    }

    // Convenience constructors

    /// Generic IO failure
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    /// The resource document to inject into does not exist
    ///
    /// `path` should already be absolute so the operator sees exactly where
    /// the file was expected.
    pub fn resource_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("Resource file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Restore the resource file from version control or fix [resource].path")
    }

    /// Generic configuration failure
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// An explicitly requested config file does not exist
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .envinject.toml file or use --config to specify a path")
    }

    /// Configuration parsed but holds invalid values
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigValidationError, message)
    }

    /// Generic process failure
    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    /// A required executable is not available
    pub fn command_not_found(cmd: &str) -> Self {
        Self::new(ErrorCode::CommandNotFound, format!("Command not found: {cmd}"))
            .with_suggestion(format!("Install {cmd} and ensure it's in your PATH"))
    }

    /// Generic validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Placeholder tokens are still present in a generated resource
    pub fn placeholders_remain(path: impl AsRef<Path>, tokens: &[&str]) -> Self {
        Self::new(
            ErrorCode::PlaceholderRemaining,
            format!(
                "Placeholders remain in {}: {}",
                path.as_ref().display(),
                tokens.join(", ")
            ),
        )
        .with_suggestion("Set the missing keys in .env and run `envinject-android inject`")
    }

    /// A Gradle invocation failed
    pub fn gradle(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GradleError, message)
    }

    /// A pre-build step failed; wraps the step's own error
    #[must_use]
    pub fn build_step(step: &str, source: Error) -> Self {
        let message = format!("Pre-build step '{step}' failed: {}", source.message);
        let suggestion = source.suggestion.clone();
        let mut err = Self::new(ErrorCode::BuildStepFailed, message).with_source(source);
        err.suggestion = suggestion;
        err
    }

    /// CLI exit status for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }
}

/// Serializable error report for logging and machine-readable output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
#[allow(missing_docs)]
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const COMMAND_NOT_FOUND: i32 = 127;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::Internal, format!("JSON error: {err}")).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {err}"))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Attach a recovery suggestion to the error, if any
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::ResourceNotFound.to_string(), "E2005");
        assert_eq!(ErrorCode::GradleError.to_string(), "E8002");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::ConfigParseError.category(), "Configuration");
        assert_eq!(ErrorCode::BuildStepFailed.category(), "Build");
    }

    #[test]
    fn test_error_code_exit_code() {
        assert_eq!(ErrorCode::ConfigParseError.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(ErrorCode::PlaceholderRemaining.exit_code(), exit_codes::VALIDATION_ERROR);
        assert_eq!(ErrorCode::CommandNotFound.exit_code(), exit_codes::COMMAND_NOT_FOUND);
        assert_eq!(ErrorCode::ResourceNotFound.exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn test_resource_not_found_names_path() {
        let err = Error::resource_not_found("/abs/app/src/main/res/values/strings.xml");

        assert_eq!(err.code, ErrorCode::ResourceNotFound);
        assert!(err.to_string().contains("/abs/app/src/main/res/values/strings.xml"));
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_build_step_keeps_suggestion() {
        let inner = Error::resource_not_found("/x/strings.xml");
        let err = Error::build_step("replaceStringsXml", inner);

        assert_eq!(err.code, ErrorCode::BuildStepFailed);
        assert!(err.message.contains("replaceStringsXml"));
        assert!(err.message.contains("/x/strings.xml"));
        assert!(err.suggestion.is_some());
        assert!(err.source.is_some());
    }

    #[test]
    fn test_error_report_serialization() {
        let err = Error::gradle("assembleDebug failed").with_context("During build");

        let report = err.to_report();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("E8002"));
        assert!(json.contains("Build"));
        assert!(json.contains("During build"));
    }

    #[test]
    fn test_placeholders_remain_is_validation_failure() {
        let err = Error::placeholders_remain("/p/strings.xml", &["@A@", "@B@"]);

        assert_eq!(err.code, ErrorCode::PlaceholderRemaining);
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_ERROR);
        assert!(err.message.contains("@A@, @B@"));
        assert_eq!(err.to_report().code_str, "E6004");
    }

    #[test]
    fn test_command_not_found_exit_code() {
        let err = Error::command_not_found("gradle");
        assert_eq!(err.exit_code(), exit_codes::COMMAND_NOT_FOUND);
        assert!(err.message.contains("gradle"));
    }

    #[test]
    fn test_io_not_found_maps_code() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert_eq!(err.code, ErrorCode::FileNotFound);
    }
}
