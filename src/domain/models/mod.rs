pub mod config;
pub mod firmware;

pub use config::{ConfigEntry, ConfigSource, ConfigStore, USER_SECTION};
pub use firmware::{KeyboardInfo, KeymapOrigin};
