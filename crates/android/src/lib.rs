//! Android pre-build tools for envinject
//!
//! This crate provides the Android side of the tooling:
//! - Environment file loading
//! - Placeholder substitution into string resources
//! - Read-only placeholder checks
//! - Pre-build step pipeline
//! - Gradle wrapper integration

#![warn(missing_docs)]

pub mod check;
pub mod env_file;
pub mod gradle;
pub mod injector;
pub mod pipeline;
pub mod placeholder;
