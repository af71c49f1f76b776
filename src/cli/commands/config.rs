//! `config`: read and write the user config file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::display::{action_success, colorize_source, list_table, output, render_list, unset, CommandOutput};
use crate::cli::types::ConfigArgs;
use crate::domain::models::{ConfigSource, ConfigStore};
use crate::infrastructure::config::{ConfigAssignment, ConfigLoader};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigRow {
    pub key: String,
    pub value: Option<String>,
    pub source: Option<ConfigSource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigOutput {
    pub entries: Vec<ConfigRow>,
    /// Where the file was written, when anything changed
    pub saved: Option<PathBuf>,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["key", "value", "source"]);
        for row in &self.entries {
            table.add_row(vec![
                row.key.clone(),
                row.value.clone().unwrap_or_else(unset),
                row.source
                    .map_or_else(String::new, |s| colorize_source(s).to_string()),
            ]);
        }

        let mut rendered = render_list("entry", table, self.entries.len());
        if let Some(path) = &self.saved {
            rendered.push('\n');
            rendered.push_str(&action_success(&format!("Saved {}", path.display())));
        }
        rendered
    }
}

/// Apply `section.option[=value]` arguments to `store`.
///
/// Reads report the effective value, including `user` fallbacks. Writes are
/// tagged `config_file`; writing `None` removes the entry. Returns the rows to
/// display and whether anything was changed.
pub fn apply(store: &mut ConfigStore, entries: &[String]) -> Result<(Vec<ConfigRow>, bool)> {
    if entries.is_empty() {
        let rows = store
            .iter()
            .map(|(section, option, entry)| ConfigRow {
                key: format!("{section}.{option}"),
                value: Some(entry.value.clone()),
                source: Some(entry.source),
            })
            .collect();
        return Ok((rows, false));
    }

    let mut rows = Vec::with_capacity(entries.len());
    let mut changed = false;

    for raw in entries {
        let assignment = ConfigAssignment::parse(raw)?;
        let key = format!("{}.{}", assignment.section, assignment.option);

        match assignment.value {
            None => {
                let entry = store.entry(&assignment.section, &assignment.option);
                rows.push(ConfigRow {
                    key,
                    value: entry.map(|e| e.value.clone()),
                    source: entry.map(|e| e.source),
                });
            }
            Some(None) => {
                changed |= store
                    .remove(&assignment.section, &assignment.option)
                    .is_some();
                rows.push(ConfigRow {
                    key,
                    value: None,
                    source: None,
                });
            }
            Some(Some(value)) => {
                store.set(
                    &assignment.section,
                    &assignment.option,
                    value.as_str(),
                    ConfigSource::ConfigFile,
                );
                changed = true;
                rows.push(ConfigRow {
                    key,
                    value: Some(value),
                    source: Some(ConfigSource::ConfigFile),
                });
            }
        }
    }

    Ok((rows, changed))
}

pub fn execute(
    args: &ConfigArgs,
    mut config: ConfigStore,
    config_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let (entries, changed) = apply(&mut config, &args.entries)?;

    let saved = if changed {
        let path = config_path.context("No config file location. Pass --config-file")?;
        ConfigLoader::save(&config, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Some(path.to_path_buf())
    } else {
        None
    };

    output(&ConfigOutput { entries, saved }, json);
    Ok(())
}
