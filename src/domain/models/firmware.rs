use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which kind of directory a keymap name was detected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeymapOrigin {
    /// `keyboards/**/keymaps/<name>`
    Keymap,
    /// `layouts/**/<name>`
    Layout,
    /// `users/<name>`
    User,
}

impl fmt::Display for KeymapOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keymap => write!(f, "keymap"),
            Self::Layout => write!(f, "layout"),
            Self::User => write!(f, "user"),
        }
    }
}

/// Summary of a keyboard folder inside the firmware tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardInfo {
    /// Canonical keyboard name, `/`-separated
    pub name: String,
    /// Absolute path of the keyboard folder
    pub path: PathBuf,
    /// Keymaps reachable from this keyboard
    pub keymaps: Vec<String>,
}
