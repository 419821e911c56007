//! Read-only placeholder check
//!
//! Reports which tokens are still present in the generated resource, without
//! touching the file.

use crate::injector::InjectorSettings;
use crate::placeholder::find_placeholder_shaped;
use envinject_cli::output::{format_count, Status};
use envinject_core::error::{exit_codes, Error, Result, ResultExt};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;

/// A recognized placeholder still present in the resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemainingToken {
    /// Env key
    pub key: String,
    /// Marker string
    pub token: String,
    /// Occurrences in the resource
    pub occurrences: usize,
}

/// Result of a placeholder check
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Resource that was checked
    pub resource_path: PathBuf,
    /// Recognized tokens still present
    pub remaining: Vec<RemainingToken>,
    /// Placeholder-shaped tokens nobody substitutes
    pub unrecognized: Vec<String>,
}

impl CheckReport {
    /// Whether every recognized token has been substituted
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.remaining.is_empty()
    }

    /// The failure this report represents, if any
    #[must_use]
    pub fn to_error(&self) -> Option<Error> {
        if self.is_clean() {
            return None;
        }
        let tokens: Vec<&str> = self.remaining.iter().map(|t| t.token.as_str()).collect();
        Some(Error::placeholders_remain(&self.resource_path, &tokens))
    }

    /// CLI exit status for this report
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.to_error().map_or(exit_codes::SUCCESS, |err| err.exit_code())
    }
}

/// Check the generated resource for leftover placeholders
pub fn check_resource(settings: &InjectorSettings) -> Result<CheckReport> {
    let path = &settings.resource_path;
    if !path.is_file() {
        return Err(Error::resource_not_found(
            std::path::absolute(path).unwrap_or_else(|_| path.clone()),
        ));
    }

    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read {}", path.display()))?;

    let remaining = settings
        .placeholders
        .iter()
        .filter_map(|p| {
            let occurrences = content.matches(p.token()).count();
            (occurrences > 0).then(|| RemainingToken {
                key: p.key().to_string(),
                token: p.token().to_string(),
                occurrences,
            })
        })
        .collect();

    let unrecognized = find_placeholder_shaped(&content)
        .into_iter()
        .filter(|token| !settings.placeholders.recognizes(token))
        .collect();

    Ok(CheckReport {
        resource_path: path.clone(),
        remaining,
        unrecognized,
    })
}

/// Print check results
pub fn print_results(report: &CheckReport) {
    if let Some(err) = report.to_error() {
        Status::error(&format!(
            "{} in {}",
            format_count(report.remaining.len(), "placeholder remains", "placeholders remain"),
            report.resource_path.display()
        ));
        for token in &report.remaining {
            println!(
                "  {} {} ({}x) - set {} in .env",
                "→".red(),
                token.token,
                token.occurrences,
                token.key.bold()
            );
        }
        if let Some(suggestion) = &err.suggestion {
            Status::info(suggestion);
        }
    } else {
        Status::success(&format!(
            "No placeholders remain in {}",
            report.resource_path.display()
        ));
    }

    for token in &report.unrecognized {
        Status::warning(&format!("Unrecognized placeholder-shaped token: {token}"));
    }
}
