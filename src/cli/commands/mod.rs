//! Subcommand handlers.

pub mod config;
pub mod info;
pub mod list_keyboards;
pub mod list_keymaps;
pub mod resolve;

use crate::domain::error::ContextError;
use crate::services::{CommandContext, KEYBOARD};

/// The resolved keyboard, or an error naming the subcommand that needed one
pub(crate) fn require_keyboard(ctx: &CommandContext<'_>) -> Result<String, ContextError> {
    ctx.get(KEYBOARD)
        .map(str::to_string)
        .ok_or_else(|| ContextError::NoKeyboard(ctx.subcommand().to_string()))
}
