//! qmkctx - directory-aware command context for QMK firmware tooling
//!
//! Commands that act on a keyboard or keymap should not make the user repeat
//! what the working directory already says. This crate provides:
//!
//! - **Context decorators** (`services`): [`automagic_keyboard`] and
//!   [`automagic_keymap`] wrap a handler and fill in `keyboard`/`keymap`
//!   from the directory, while recording where every value came from.
//! - **Timed memoization** (`adapters::cache`): [`timed_lru_cache`] wraps a
//!   function with an LRU cache that is flushed wholesale after a timeout.
//! - **Configuration** (`domain`, `infrastructure::config`): per-subcommand
//!   option store with provenance, backed by a YAML file.
//! - **Firmware tree** (`infrastructure::firmware`): the filesystem lookups
//!   the decorators rely on.
//! - **CLI** (`cli`): the `qmkctx` binary.
//!
//! # Example
//!
//! ```ignore
//! use qmkctx::{automagic_keyboard, CommandContext, ConfigStore, FsFirmwareTree};
//!
//! let tree = FsFirmwareTree::new("/home/me/qmk_firmware");
//! let mut ctx = CommandContext::new("compile", std::env::current_dir()?, ConfigStore::new(), &tree);
//! let keyboard = automagic_keyboard(|ctx: &mut CommandContext<'_>| -> anyhow::Result<_> {
//!     Ok(ctx.get("keyboard").map(str::to_string))
//! })(&mut ctx)?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::cache::{
    timed_lru_cache, CacheInfo, CacheOptions, CachedFn, Clock, ManualClock, MonotonicClock,
    TimedLruCache,
};
pub use domain::models::{ConfigEntry, ConfigSource, ConfigStore, KeyboardInfo, KeymapOrigin};
pub use domain::{ConfigError, ContextError, FirmwareTree};
pub use infrastructure::config::ConfigLoader;
pub use infrastructure::firmware::FsFirmwareTree;
pub use services::{
    apply_keyboard_context, apply_keymap_context, automagic_keyboard, automagic_keymap,
    CommandContext,
};
