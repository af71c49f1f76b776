//! Common test utilities for integration tests
//!
//! Builds throwaway `qmk_firmware` checkouts on disk.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A firmware checkout in a temporary directory
pub struct FixtureTree {
    dir: TempDir,
}

impl FixtureTree {
    /// An empty checkout: just `keyboards/` and `quantum/`
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("keyboards")).unwrap();
        fs::create_dir_all(dir.path().join("quantum")).unwrap();
        Self { dir }
    }

    /// A small checkout with a few keyboards, keymaps, a layout and a user
    pub fn standard() -> Self {
        Self::empty()
            .file("keyboards/planck/info.json")
            .file("keyboards/planck/keymaps/default/keymap.c")
            .file("keyboards/planck/rev6/rules.mk")
            .file("keyboards/planck/rev6/keymaps/via/keymap.json")
            .file("keyboards/ergodox_ez/keyboard.json")
            .file("keyboards/ergodox_ez/keymaps/steno/keymap.c")
            .file("layouts/community/ortho_4x12/jackhumbert/keymap.c")
            .file("users/drashna/drashna.c")
            .aliases(r#"{"planck/rev6_drop": {"target": "planck/rev6"}, "ez": {"target": "ergodox_ez"}}"#)
    }

    /// Create an empty file (and its parents) under the root
    pub fn file(self, relative: &str) -> Self {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        self
    }

    /// Write the keyboard alias table
    pub fn aliases(self, json: &str) -> Self {
        let path = self.path("data/mappings/keyboard_aliases.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, json).unwrap();
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
