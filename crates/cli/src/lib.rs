//! CLI utilities for envinject build tooling
//!
//! Provides shared CLI functionality:
//! - Terminal output formatting
//! - Progress indicators
//! - Secret masking for status listings

#![warn(missing_docs)]

pub mod output;
pub mod progress;
