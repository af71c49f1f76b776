use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving keyboard/keymap context from the firmware tree
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Invalid keyboard: {0}")]
    InvalidKeyboard(String),

    #[error("Keyboard alias cycle detected: {}", .0.join(" -> "))]
    AliasCycle(Vec<String>),

    #[error("Failed to load keyboard aliases from {path}: {message}")]
    AliasTable { path: PathBuf, message: String },

    #[error("No keyboard specified for `{0}`. Pass --keyboard or run from a keyboard directory")]
    NoKeyboard(String),

    #[error("Could not find a qmk_firmware checkout from {0}. Set QMK_HOME or user.qmk_home")]
    FirmwareRootNotFound(PathBuf),
}

/// Errors raised while loading, editing, or saving the config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Load {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to save config to {path}: {message}")]
    Save { path: PathBuf, message: String },

    #[error("Invalid config key: {0}. Expected <section>.<option>")]
    InvalidKey(String),
}
