//! Infrastructure layer module
//!
//! Implementations that touch the outside world:
//! - Configuration management (YAML via serde_yaml)
//! - Logging infrastructure
//! - Firmware tree inspection on the filesystem
//!
//! The firmware tree satisfies the port trait defined in the domain layer.

pub mod config;
pub mod firmware;
pub mod logging;
