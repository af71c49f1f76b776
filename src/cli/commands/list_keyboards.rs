//! `list-keyboards`: every keyboard in the firmware tree.

use anyhow::Result;
use serde::Serialize;

use crate::cli::display::{list_table, output, render_list, CommandOutput};
use crate::infrastructure::firmware::FsFirmwareTree;

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardListOutput {
    pub root: String,
    pub keyboards: Vec<String>,
    pub total: usize,
}

impl CommandOutput for KeyboardListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["keyboard"]);
        for keyboard in &self.keyboards {
            table.add_row(vec![keyboard.as_str()]);
        }
        render_list("keyboard", table, self.total)
    }
}

pub fn run(tree: &FsFirmwareTree) -> KeyboardListOutput {
    let keyboards = tree.list_keyboards().as_ref().clone();
    KeyboardListOutput {
        root: tree.root().display().to_string(),
        total: keyboards.len(),
        keyboards,
    }
}

pub fn execute(tree: &FsFirmwareTree, json: bool) -> Result<()> {
    output(&run(tree), json);
    Ok(())
}
