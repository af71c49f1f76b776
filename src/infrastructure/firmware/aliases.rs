//! Legacy keyboard name mappings.
//!
//! `data/mappings/keyboard_aliases.json` maps names that keyboards used to
//! have onto where they live now:
//!
//! ```json
//! { "ergodox_infinity": { "target": "ergodox_infinity/rev1" } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::domain::error::ContextError;

/// Location of the alias table relative to the firmware root
pub const ALIAS_FILE: &str = "data/mappings/keyboard_aliases.json";

#[derive(Debug, Deserialize)]
struct AliasDefinition {
    target: Option<String>,
}

/// alias -> target keyboard name
pub type AliasTable = BTreeMap<String, String>;

/// Read the alias table under `root`. A tree without one has no aliases.
pub fn load_alias_table((root,): (PathBuf,)) -> Result<Arc<AliasTable>, ContextError> {
    let path = alias_file(&root);
    let table_error = |message: String| ContextError::AliasTable {
        path: path.clone(),
        message,
    };

    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no keyboard alias table");
            return Ok(Arc::new(AliasTable::new()));
        }
        Err(e) => return Err(table_error(e.to_string())),
    };

    let definitions: BTreeMap<String, AliasDefinition> =
        serde_json::from_str(&contents).map_err(|e| table_error(e.to_string()))?;

    // An alias without a target points at itself, which ends resolution.
    let table: AliasTable = definitions
        .into_iter()
        .filter_map(|(alias, def)| def.target.map(|target| (alias, target)))
        .collect();

    debug!(path = %path.display(), aliases = table.len(), "loaded keyboard aliases");
    Ok(Arc::new(table))
}

/// Follow aliases from `keyboard` until reaching a name that is not an alias.
///
/// A self-referencing alias stops the walk. Any longer loop is an error.
pub fn resolve_alias(table: &AliasTable, keyboard: &str) -> Result<String, ContextError> {
    let mut current = keyboard.to_string();
    let mut chain = vec![current.clone()];

    while let Some(target) = table.get(&current) {
        if *target == current {
            break;
        }
        if chain.contains(target) {
            chain.push(target.clone());
            return Err(ContextError::AliasCycle(chain));
        }
        current.clone_from(target);
        chain.push(current.clone());
    }

    Ok(current)
}

/// Path of the alias table for a firmware root
pub fn alias_file(root: &Path) -> PathBuf {
    root.join(ALIAS_FILE)
}
