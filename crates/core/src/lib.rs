//! Core utilities for envinject build tooling
//!
//! This crate provides shared functionality used by the platform-specific tools:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//! - **Process execution**: Command execution in a project directory
//!
//! # Example
//!
//! ```rust,no_run
//! use envinject_core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("."), None).expect("invalid config");
//! println!("env file: {}", config.schema.env.path.display());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, EscapeMode, PlaceholderConfig};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::process::CommandResult;
}
