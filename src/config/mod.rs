//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (config.toml under the user config directory)
//! 3. Project config (.pkgsage/config.toml)
//! 4. Environment variables (PKGSAGE_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
