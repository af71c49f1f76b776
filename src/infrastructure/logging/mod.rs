//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - pretty or JSON output on stderr
//! - optional JSON log file via tracing-appender

pub mod config;
pub mod logger;

pub use config::{LogConfig, LogFormat};
pub use logger::LoggerImpl;
