//! Gradle build system integration
//!
//! Runs tasks through the project's Gradle wrapper, or a `gradle` found on
//! PATH when the project has no wrapper.

use envinject_core::error::{Error, Result, ResultExt};
use envinject_core::process::{
    run_command_in_dir, run_command_streaming_in_dir, which_command, CommandResult,
};
use std::path::{Path, PathBuf};

/// File name of the Gradle wrapper on this platform
#[must_use]
pub fn wrapper_name() -> &'static str {
    if cfg!(windows) {
        "gradlew.bat"
    } else {
        "gradlew"
    }
}

/// Locate the Gradle executable for `project_dir`
///
/// The returned path is absolute, so it stays valid once the child process
/// runs inside `project_dir`.
pub fn find_gradle(project_dir: &Path) -> Result<PathBuf> {
    let project_dir = absolute_dir(project_dir)?;
    let wrapper = project_dir.join(wrapper_name());
    if wrapper.is_file() {
        return Ok(wrapper);
    }

    if let Some(gradle) = which_command("gradle") {
        tracing::debug!(path = %gradle.display(), "no wrapper, using gradle from PATH");
        return Ok(gradle);
    }

    Err(Error::command_not_found("gradle")
        .with_context(format!("No Gradle wrapper at {}", wrapper.display()))
        .with_suggestion("Run from the Android project root or pass --project-dir"))
}

/// Run a Gradle task and capture its output
pub fn run_task(project_dir: &Path, task: &str) -> Result<CommandResult> {
    let gradle = find_gradle(project_dir)?;
    run_command_in_dir(&gradle.to_string_lossy(), &[task], &absolute_dir(project_dir)?)
}

/// Run a Gradle task with its output going straight to the terminal
pub fn run_task_streaming(project_dir: &Path, task: &str) -> Result<()> {
    let gradle = find_gradle(project_dir)?;
    let code = run_command_streaming_in_dir(
        &gradle.to_string_lossy(),
        &[task],
        &absolute_dir(project_dir)?,
    )?;
    if code == 0 {
        Ok(())
    } else {
        Err(Error::gradle(format!("Gradle task {task} failed with exit code {code}")))
    }
}

/// Run a Gradle task, turning a non-zero exit into an error
pub fn run_task_checked(project_dir: &Path, task: &str) -> Result<CommandResult> {
    let result = run_task(project_dir, task)?;
    if result.success {
        Ok(result)
    } else {
        Err(Error::gradle(format!(
            "Gradle task {task} failed with exit code {}",
            result.exit_code
        ))
        .with_context(result.combined_output().trim().to_string()))
    }
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    std::path::absolute(dir)
        .map_err(Error::from)
        .context(format!("Failed to resolve {}", dir.display()))
}
