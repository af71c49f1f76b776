use std::path::Path;

use super::error::ContextError;
use super::models::KeymapOrigin;

/// Read-only view of a QMK firmware checkout used for context detection.
///
/// Implementations answer purely from the path they are given; they never
/// consult the process working directory themselves.
pub trait FirmwareTree {
    /// Keyboard name for a directory inside `keyboards/`, if any
    fn find_keyboard_from_dir(&self, cwd: &Path) -> Option<String>;

    /// Keymap name and the kind of directory it was found in, if any
    fn find_keymap_from_dir(&self, cwd: &Path) -> Option<(String, KeymapOrigin)>;

    /// Map a possibly-legacy keyboard name to its current folder name
    ///
    /// # Errors
    /// Returns [`ContextError::InvalidKeyboard`] when the name does not
    /// resolve to a keyboard folder, or [`ContextError::AliasCycle`] when the
    /// alias table loops.
    fn keyboard_folder(&self, keyboard: &str) -> Result<String, ContextError>;
}
