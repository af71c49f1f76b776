//! QMK firmware checkout inspection
//!
//! Answers the directory questions the context decorators ask: which
//! keyboard or keymap the working directory belongs to, and what a legacy
//! keyboard name is called today.

pub mod aliases;
pub mod tree;

pub use aliases::{resolve_alias, AliasTable, ALIAS_FILE};
pub use tree::{is_keymap_dir, FsFirmwareTree, SCAN_CACHE_TIMEOUT};
