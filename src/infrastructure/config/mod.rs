//! Configuration management infrastructure
//!
//! YAML config file handling using serde_yaml:
//! - per-subcommand sections with a `user` fallback section
//! - provenance tagging of every loaded value
//! - `section.option=value` editing and write-back

pub mod loader;

pub use loader::{ConfigAssignment, ConfigLoader, CONFIG_PATH_ENV, UNSET_VALUE};
