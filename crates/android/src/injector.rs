//! Credential injection into Android string resources
//!
//! Substitutes placeholder tokens in `strings.xml` with values from the local
//! env file before the Gradle build compiles resources. A token whose key is
//! not defined is left untouched.

use crate::env_file::EnvProperties;
use crate::pipeline::PreBuildStep;
use crate::placeholder::{contains_placeholder_shape, PlaceholderSet};
use envinject_cli::output::{format_count, Status};
use envinject_core::config::{ConfigSchema, EscapeMode};
use envinject_core::error::{Error, Result, ResultExt};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Name under which the injection step is registered in the pre-build pipeline
pub const STEP_NAME: &str = "replaceStringsXml";

/// Resolved paths and options for one injection
#[derive(Debug, Clone)]
pub struct InjectorSettings {
    /// Env file location
    pub env_path: PathBuf,
    /// Resource document that is written
    pub resource_path: PathBuf,
    /// Canonical template read instead of the resource, if configured
    pub template_path: Option<PathBuf>,
    /// Value escaping
    pub escape: EscapeMode,
    /// Recognized placeholders
    pub placeholders: PlaceholderSet,
}

impl InjectorSettings {
    /// Resolve configured paths against `project_dir`
    #[must_use]
    pub fn from_config(project_dir: &Path, schema: &ConfigSchema) -> Self {
        Self {
            env_path: project_dir.join(&schema.env.path),
            resource_path: project_dir.join(&schema.resource.path),
            template_path: schema.resource.template.as_ref().map(|t| project_dir.join(t)),
            escape: schema.resource.escape,
            placeholders: PlaceholderSet::from_config(&schema.placeholders),
        }
    }

    /// The file substitution reads from
    #[must_use]
    pub fn input_path(&self) -> &Path {
        self.template_path.as_deref().unwrap_or(&self.resource_path)
    }
}

/// Whether an injection writes its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Write the resource when its content changes
    Write,
    /// Compute the report only
    DryRun,
}

/// What happened to one placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderOutcome {
    /// Env key
    pub key: String,
    /// Marker string
    pub token: String,
    /// Whether the env file defined the key
    pub sourced: bool,
    /// Occurrences of the token found in the input
    pub occurrences: usize,
}

/// Result of one injection run
#[derive(Debug, Clone, Serialize)]
pub struct InjectionReport {
    /// Absolute resource path
    pub resource_path: PathBuf,
    /// Env file that was expected
    pub env_path: PathBuf,
    /// Whether the env file existed
    pub env_found: bool,
    /// Env file lines skipped as malformed
    pub env_skipped_lines: Vec<usize>,
    /// Per-placeholder outcomes in substitution order
    pub outcomes: Vec<PlaceholderOutcome>,
    /// Whether the rendered text differs from the resource on disk
    pub changed: bool,
    /// Whether the resource was written
    pub written: bool,
}

impl InjectionReport {
    /// Whether at least one credential came from the env file
    #[must_use]
    pub fn any_sourced(&self) -> bool {
        self.outcomes.iter().any(|o| o.sourced)
    }

    /// Placeholders left in place
    pub fn remaining(&self) -> impl Iterator<Item = &PlaceholderOutcome> {
        self.outcomes.iter().filter(|o| !o.sourced)
    }

    /// Number of placeholders sourced from the env file
    #[must_use]
    pub fn sourced_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.sourced).count()
    }
}

/// Substitute every placeholder in `input`
///
/// Placeholders are applied in order, each replacing all of its occurrences.
#[must_use]
pub fn render(
    input: &str,
    placeholders: &PlaceholderSet,
    env: &EnvProperties,
    escape: EscapeMode,
) -> (String, Vec<PlaceholderOutcome>) {
    let mut content = input.to_string();
    let mut outcomes = Vec::with_capacity(placeholders.len());

    for placeholder in placeholders {
        let resolution = placeholder.resolve(env, escape);
        let occurrences = content.matches(placeholder.token()).count();

        if resolution.sourced {
            if contains_placeholder_shape(&resolution.value) {
                tracing::warn!(
                    key = placeholder.key(),
                    "value looks like a placeholder; repeated runs may not converge"
                );
            }
            content = content.replace(placeholder.token(), &resolution.value);
        }

        outcomes.push(PlaceholderOutcome {
            key: placeholder.key().to_string(),
            token: placeholder.token().to_string(),
            sourced: resolution.sourced,
            occurrences,
        });
    }

    (content, outcomes)
}

/// Inject `env` into the resource described by `settings`
///
/// Fails without writing when the input document does not exist.
pub fn inject(
    settings: &InjectorSettings,
    env: &EnvProperties,
    mode: WriteMode,
) -> Result<InjectionReport> {
    let input_path = settings.input_path();
    if !input_path.is_file() {
        return Err(Error::resource_not_found(absolute(input_path)));
    }

    let input = std::fs::read_to_string(input_path)
        .map_err(Error::from)
        .context(format!("Failed to read {}", input_path.display()))?;

    let (rendered, outcomes) = render(&input, &settings.placeholders, env, settings.escape);

    let current = if settings.template_path.is_some() {
        read_existing(&settings.resource_path)?
    } else {
        Some(input)
    };
    let changed = current.as_deref() != Some(rendered.as_str());

    let written = changed && mode == WriteMode::Write;
    if written {
        if let Some(parent) = settings.resource_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(Error::from)
                .context(format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&settings.resource_path, &rendered)
            .map_err(Error::from)
            .context(format!("Failed to write {}", settings.resource_path.display()))?;
    }

    tracing::debug!(
        resource = %settings.resource_path.display(),
        changed,
        written,
        "injection finished"
    );

    Ok(InjectionReport {
        resource_path: absolute(&settings.resource_path),
        env_path: settings.env_path.clone(),
        env_found: env.source().is_some(),
        env_skipped_lines: env.skipped_lines().to_vec(),
        outcomes,
        changed,
        written,
    })
}

/// Print the operator-facing status lines for a report
pub fn print_report(report: &InjectionReport) {
    if !report.env_found {
        Status::warning(&format!(
            ".env file not found at {}. Create it from .env.example.",
            report.env_path.display()
        ));
    }

    if !report.env_skipped_lines.is_empty() {
        let lines: Vec<String> = report
            .env_skipped_lines
            .iter()
            .map(ToString::to_string)
            .collect();
        Status::warning(&format!(
            "Skipped malformed {} in {}: {}",
            if lines.len() == 1 { "line" } else { "lines" },
            report.env_path.display(),
            lines.join(", ")
        ));
    }

    for outcome in &report.outcomes {
        if outcome.sourced && outcome.occurrences == 0 {
            Status::warning(&format!(
                "{} is set but {} does not appear in the resource",
                outcome.key, outcome.token
            ));
        }
    }

    if report.any_sourced() {
        Status::success(&format!(
            "Injected {} from .env into {}",
            format_count(report.sourced_count(), "credential", "credentials"),
            report.resource_path.display()
        ));
        let remaining: Vec<&str> = report.remaining().map(|o| o.key.as_str()).collect();
        if !remaining.is_empty() {
            Status::warning(&format!("Not set in .env: {}", remaining.join(", ")));
        }
    } else {
        Status::warning("No credentials found in .env; resource placeholders remain as-is");
    }
}

/// Pre-build step that loads the env file and injects it
#[derive(Debug, Clone)]
pub struct ReplaceStringsStep {
    settings: InjectorSettings,
    report: Option<InjectionReport>,
}

impl ReplaceStringsStep {
    /// Create the step
    #[must_use]
    pub fn new(settings: InjectorSettings) -> Self {
        Self {
            settings,
            report: None,
        }
    }

    /// Report from the last run
    #[must_use]
    pub fn report(&self) -> Option<&InjectionReport> {
        self.report.as_ref()
    }
}

impl PreBuildStep for ReplaceStringsStep {
    fn name(&self) -> &str {
        STEP_NAME
    }

    fn run(&mut self) -> Result<()> {
        let env = EnvProperties::load(&self.settings.env_path)?;
        let report = inject(&self.settings, &env, WriteMode::Write)?;
        print_report(&report);
        self.report = Some(report);
        Ok(())
    }
}

/// Contents of a generated resource, or `None` if it has not been written yet
fn read_existing(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::from(e).with_context(format!("Failed to read {}", path.display()))),
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
