//! `info`: describe the keyboard in context.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::require_keyboard;
use crate::cli::display::{colorize_source, output, CommandOutput, DetailView};
use crate::cli::types::KeyboardArgs;
use crate::domain::models::{ConfigSource, ConfigStore};
use crate::infrastructure::firmware::FsFirmwareTree;
use crate::services::{automagic_keyboard, CommandContext, KEYBOARD};

pub const NAME: &str = "info";

#[derive(Debug, Clone, Serialize)]
pub struct InfoOutput {
    pub keyboard: String,
    pub source: Option<ConfigSource>,
    pub path: String,
    pub keymaps: Vec<String>,
}

impl CommandOutput for InfoOutput {
    fn to_human(&self) -> String {
        let source = self
            .source
            .map_or_else(String::new, |s| colorize_source(s).to_string());

        let mut view = DetailView::new(&self.keyboard)
            .field("Path", &self.path)
            .field("Source", &source)
            .section("Keymaps");
        for keymap in &self.keymaps {
            view = view.item(keymap);
        }
        view.render()
    }
}

pub fn run(
    args: &KeyboardArgs,
    config: ConfigStore,
    cwd: &Path,
    tree: &FsFirmwareTree,
) -> Result<InfoOutput> {
    let mut ctx = CommandContext::new(NAME, cwd, config, tree);
    ctx.config_mut()
        .apply_arguments(NAME, [(KEYBOARD, args.keyboard.as_deref())]);

    let handler = automagic_keyboard(|ctx: &mut CommandContext<'_>| -> Result<InfoOutput> {
        let requested = require_keyboard(ctx)?;
        let info = tree.keyboard_info(&requested)?;
        Ok(InfoOutput {
            keyboard: info.name,
            source: ctx.source(KEYBOARD),
            path: info.path.display().to_string(),
            keymaps: info.keymaps,
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
