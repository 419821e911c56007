//! Pre-build step pipeline
//!
//! Steps are registered by name and run in registration order before the
//! compilation task. Running consumes the pipeline, so each registered step
//! executes at most once per build.

use envinject_core::error::{Error, ErrorCode, Result};
use std::time::{Duration, Instant};

/// A step that must finish before compilation starts
pub trait PreBuildStep {
    /// Unique step name
    fn name(&self) -> &str;

    /// Run the step
    fn run(&mut self) -> Result<()>;
}

/// Timing for one completed step
#[derive(Debug, Clone)]
pub struct StepTiming {
    /// Step name
    pub name: String,
    /// Wall time spent in the step
    pub duration: Duration,
}

/// Ordered collection of pre-build steps
#[derive(Default)]
pub struct BuildPipeline {
    steps: Vec<Box<dyn PreBuildStep>>,
}

impl BuildPipeline {
    /// Create an empty pipeline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step; names must be unique
    pub fn register(&mut self, step: impl PreBuildStep + 'static) -> Result<()> {
        if self.steps.iter().any(|s| s.name() == step.name()) {
            return Err(Error::new(
                ErrorCode::DuplicateBuildStep,
                format!("Pre-build step '{}' is already registered", step.name()),
            ));
        }
        tracing::debug!(step = step.name(), "registered pre-build step");
        self.steps.push(Box::new(step));
        Ok(())
    }

    /// Names of registered steps in run order
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step, stopping at the first failure
    pub fn run(self) -> Result<Vec<StepTiming>> {
        let mut timings = Vec::with_capacity(self.steps.len());

        for mut step in self.steps {
            let name = step.name().to_string();
            tracing::info!(step = %name, "running pre-build step");

            let start = Instant::now();
            step.run().map_err(|e| Error::build_step(&name, e))?;
            let duration = start.elapsed();

            tracing::debug!(step = %name, ?duration, "pre-build step finished");
            timings.push(StepTiming { name, duration });
        }

        Ok(timings)
    }

    /// Run every step, then `compile` only if all of them succeeded
    pub fn run_then<T>(self, compile: impl FnOnce() -> Result<T>) -> Result<T> {
        self.run()?;
        compile()
    }
}
