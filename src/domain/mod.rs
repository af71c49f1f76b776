//! Domain layer for qmkctx
//!
//! Configuration provenance, firmware-tree models, and the port the
//! context decorators consult.

pub mod error;
pub mod models;
pub mod ports;

pub use error::{ConfigError, ContextError};
pub use ports::FirmwareTree;
