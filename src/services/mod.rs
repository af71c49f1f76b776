//! Services layer
//!
//! Command-context handling shared by every subcommand handler.

pub mod automagic;

pub use automagic::{
    apply_keyboard_context, apply_keymap_context, automagic_keyboard, automagic_keymap,
    CommandContext, KEYBOARD, KEYMAP,
};
