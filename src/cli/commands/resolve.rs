//! `resolve`: show what the decorators make of the current directory.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::cli::display::{colorize_source, output, unset, CommandOutput, DetailView};
use crate::cli::types::ResolveArgs;
use crate::domain::models::{ConfigSource, ConfigStore};
use crate::domain::ports::FirmwareTree;
use crate::services::{automagic_keyboard, automagic_keymap, CommandContext, KEYBOARD, KEYMAP};

pub const NAME: &str = "resolve";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOption {
    pub value: Option<String>,
    pub source: Option<ConfigSource>,
}

impl ResolvedOption {
    fn from_context(ctx: &CommandContext<'_>, option: &str) -> Self {
        Self {
            value: ctx.get(option).map(str::to_string),
            source: ctx.source(option),
        }
    }

    fn render(&self) -> String {
        match (&self.value, self.source) {
            (Some(value), Some(source)) => format!("{value} ({})", colorize_source(source)),
            (Some(value), None) => value.clone(),
            (None, _) => unset(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutput {
    pub cwd: String,
    pub keyboard: ResolvedOption,
    pub keymap: ResolvedOption,
}

impl CommandOutput for ResolveOutput {
    fn to_human(&self) -> String {
        DetailView::new("Resolved context")
            .field("Directory", &self.cwd)
            .field("Keyboard", &self.keyboard.render())
            .field("Keymap", &self.keymap.render())
            .render()
    }
}

fn describe(ctx: &mut CommandContext<'_>) -> Result<ResolveOutput> {
    Ok(ResolveOutput {
        cwd: ctx.cwd().display().to_string(),
        keyboard: ResolvedOption::from_context(ctx, KEYBOARD),
        keymap: ResolvedOption::from_context(ctx, KEYMAP),
    })
}

/// Build the context for `resolve` and run it through both decorators
pub fn run(
    args: &ResolveArgs,
    config: ConfigStore,
    cwd: &Path,
    tree: &dyn FirmwareTree,
) -> Result<ResolveOutput> {
    let mut ctx = CommandContext::new(NAME, cwd, config, tree);
    ctx.config_mut().apply_defaults(NAME, [(KEYMAP, "default")]);
    ctx.config_mut().apply_arguments(
        NAME,
        [
            (KEYBOARD, args.keyboard.as_deref()),
            (KEYMAP, args.keymap.as_deref()),
        ],
    );

    let handler = automagic_keyboard(automagic_keymap(describe));
    handler(&mut ctx)
}

pub fn execute(
    args: &ResolveArgs,
    config: ConfigStore,
    cwd: &Path,
    tree: &dyn FirmwareTree,
    json: bool,
) -> Result<()> {
    let result = run(args, config, cwd, tree)?;
    output(&result, json);
    Ok(())
}
