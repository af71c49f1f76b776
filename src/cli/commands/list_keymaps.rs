//! `list-keymaps`: keymaps available to the keyboard in context.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::require_keyboard;
use crate::cli::display::{list_table, output, render_list, CommandOutput};
use crate::cli::types::KeyboardArgs;
use crate::domain::models::ConfigStore;
use crate::domain::ports::FirmwareTree;
use crate::infrastructure::firmware::FsFirmwareTree;
use crate::services::{automagic_keyboard, CommandContext, KEYBOARD};

pub const NAME: &str = "list-keymaps";

#[derive(Debug, Clone, Serialize)]
pub struct KeymapListOutput {
    pub keyboard: String,
    pub keymaps: Vec<String>,
}

impl CommandOutput for KeymapListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["keymap"]);
        for keymap in &self.keymaps {
            table.add_row(vec![keymap.as_str()]);
        }
        format!(
            "{}\n{}",
            self.keyboard,
            render_list("keymap", table, self.keymaps.len())
        )
    }
}

pub fn run(
    args: &KeyboardArgs,
    config: ConfigStore,
    cwd: &Path,
    tree: &FsFirmwareTree,
) -> Result<KeymapListOutput> {
    let mut ctx = CommandContext::new(NAME, cwd, config, tree);
    ctx.config_mut()
        .apply_arguments(NAME, [(KEYBOARD, args.keyboard.as_deref())]);

    let handler = automagic_keyboard(|ctx: &mut CommandContext<'_>| -> Result<KeymapListOutput> {
        let keyboard = tree.keyboard_folder(&require_keyboard(ctx)?)?;
        Ok(KeymapListOutput {
            keymaps: tree.list_keymaps(&keyboard),
            keyboard,
        })
    });
    handler(&mut ctx)
}

pub fn execute(
    args: &KeyboardArgs,
    config: ConfigStore,
    cwd: &Path,
    tree: &FsFirmwareTree,
    json: bool,
) -> Result<()> {
    let result = run(args, config, cwd, tree)?;
    output(&result, json);
    Ok(())
}
