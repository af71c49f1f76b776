use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::error::ConfigError;
use crate::domain::models::{ConfigSource, ConfigStore};

/// Environment variable naming an alternate config file
pub const CONFIG_PATH_ENV: &str = "QMKCTX_CONFIG";

/// Value written to `config` to remove an entry
pub const UNSET_VALUE: &str = "None";

/// `section -> option -> value`. A null section or option is skipped, the
/// same as an unset one. Scalars are kept as written, so `2.10` stays `2.10`.
type RawConfig = Option<BTreeMap<String, Option<BTreeMap<String, Option<String>>>>>;

/// A parsed `section.option[=value]` argument to the `config` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigAssignment {
    pub section: String,
    pub option: String,
    /// `None` for a read, `Some(None)` for an unset, `Some(Some(v))` for a write
    pub value: Option<Option<String>>,
}

impl ConfigAssignment {
    pub fn parse(arg: &str) -> Result<Self, ConfigError> {
        let (key, value) = match arg.split_once('=') {
            Some((key, value)) => {
                let value = if value == UNSET_VALUE {
                    None
                } else {
                    Some(value.to_string())
                };
                (key, Some(value))
            }
            None => (arg, None),
        };

        let (section, option) = key
            .split_once('.')
            .filter(|(s, o)| !s.is_empty() && !o.is_empty() && !o.contains('.'))
            .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;

        Ok(Self {
            section: section.to_string(),
            option: option.to_string(),
            value,
        })
    }
}

/// Loads and saves the per-subcommand YAML config file
pub struct ConfigLoader;

impl ConfigLoader {
    /// Config file location when `--config-file` is not given.
    ///
    /// `$QMKCTX_CONFIG`, else `<user config dir>/qmkctx/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|dir| dir.join("qmkctx").join("config.yaml")))
    }

    /// Load the config file. Every value is tagged `config_file`.
    ///
    /// A missing or empty file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<ConfigStore, ConfigError> {
        let path = path.as_ref();
        let mut store = ConfigStore::new();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, starting empty");
                return Ok(store);
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(store);
        }

        let raw: RawConfig = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        for (section, options) in raw.into_iter().flatten() {
            for (option, value) in options.into_iter().flatten() {
                if let Some(value) = value {
                    store.set(&section, &option, value, ConfigSource::ConfigFile);
                }
            }
        }

        debug!(path = %path.display(), "loaded config file");
        Ok(store)
    }

    /// Write every `config_file` entry back to disk.
    ///
    /// Values detected from directories, defaults, and arguments are
    /// session-only and never persisted.
    pub fn save(store: &ConfigStore, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let save_error = |message: String| ConfigError::Save {
            path: path.to_path_buf(),
            message,
        };

        let mut persisted: BTreeMap<&str, BTreeMap<&str, &str>> = BTreeMap::new();
        for (section, option, entry) in store.iter() {
            if entry.source == ConfigSource::ConfigFile {
                persisted
                    .entry(section)
                    .or_default()
                    .insert(option, entry.value.as_str());
            }
        }

        let yaml = serde_yaml::to_string(&persisted).map_err(|e| save_error(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| save_error(e.to_string()))?;
        }
        fs::write(path, yaml).map_err(|e| save_error(e.to_string()))?;

        debug!(path = %path.display(), "saved config file");
        Ok(())
    }
}
