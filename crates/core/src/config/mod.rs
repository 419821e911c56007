//! Configuration loading and schema definitions
//!
//! Shared configuration types used by every envinject tool.

mod loader;
mod schema;

pub use loader::{Config, CONFIG_CANDIDATES};
pub use schema::*;
