//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Status message helpers
pub struct Status;

impl Status {
    /// Suppress success, info and step lines; warnings and errors still print
    pub fn set_quiet(quiet: bool) {
        QUIET.store(quiet, Ordering::Relaxed);
    }

    fn quiet() -> bool {
        QUIET.load(Ordering::Relaxed)
    }

    /// Print a success message
    pub fn success(message: &str) {
        if !Self::quiet() {
            println!("{} {}", "✓".green(), message);
        }
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        if !Self::quiet() {
            println!("{} {}", "ℹ".blue(), message);
        }
    }

    /// Print a step message (for multi-step operations)
    pub fn step(step: usize, total: usize, message: &str) {
        if !Self::quiet() {
            println!("{} {}", format!("[{step}/{total}]").dimmed(), message);
        }
    }

    /// Print a header
    pub fn header(message: &str) {
        if !Self::quiet() {
            println!();
            println!("{}", message.bold());
            println!("{}", "─".repeat(message.chars().count()));
        }
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Mask a secret for display, keeping at most the first two characters
///
/// Values of four characters or fewer are fully masked.
pub fn mask_secret(value: &str) -> String {
    let len = value.chars().count();
    if len <= 4 {
        return "*".repeat(len.max(1));
    }
    let visible: String = value.chars().take(2).collect();
    format!("{visible}{}", "*".repeat(len - 2))
}
