use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::firmware::KeymapOrigin;

/// Section whose options apply to every subcommand that lacks its own value
pub const USER_SECTION: &str = "user";

/// How a configuration value came to be set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in default registered by the subcommand
    Default,
    /// Read from the YAML config file
    ConfigFile,
    /// Passed explicitly on the command line
    Argument,
    /// Detected from a `keyboards/<name>` directory
    KeyboardDirectory,
    /// Detected from a `keyboards/**/keymaps/<name>` directory
    KeymapDirectory,
    /// Detected from a `layouts/**/<name>` community keymap directory
    LayoutDirectory,
    /// Detected from a `users/<name>` userspace directory
    UserDirectory,
}

impl ConfigSource {
    /// The snake_case tag used in output and serialized config
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::ConfigFile => "config_file",
            Self::Argument => "argument",
            Self::KeyboardDirectory => "keyboard_directory",
            Self::KeymapDirectory => "keymap_directory",
            Self::LayoutDirectory => "layout_directory",
            Self::UserDirectory => "user_directory",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<KeymapOrigin> for ConfigSource {
    fn from(origin: KeymapOrigin) -> Self {
        match origin {
            KeymapOrigin::Keymap => Self::KeymapDirectory,
            KeymapOrigin::Layout => Self::LayoutDirectory,
            KeymapOrigin::User => Self::UserDirectory,
        }
    }
}

/// A configuration value together with its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: ConfigSource,
}

impl ConfigEntry {
    pub fn new(value: impl Into<String>, source: ConfigSource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }
}

/// Per-subcommand configuration values with provenance tracking.
///
/// Sections are keyed by subcommand name. Lookups that miss in a subcommand's
/// section fall back to the [`USER_SECTION`], so `user.keyboard` acts as the
/// default keyboard for every command. Writes always land in the named
/// section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigStore {
    sections: BTreeMap<String, BTreeMap<String, ConfigEntry>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry, falling back to the `user` section
    pub fn entry(&self, section: &str, option: &str) -> Option<&ConfigEntry> {
        self.own_entry(section, option).or_else(|| {
            if section == USER_SECTION {
                None
            } else {
                self.own_entry(USER_SECTION, option)
            }
        })
    }

    /// Look up an entry in exactly this section, without fallback
    pub fn own_entry(&self, section: &str, option: &str) -> Option<&ConfigEntry> {
        self.sections.get(section).and_then(|s| s.get(option))
    }

    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.entry(section, option).map(|e| e.value.as_str())
    }

    pub fn source(&self, section: &str, option: &str) -> Option<ConfigSource> {
        self.entry(section, option).map(|e| e.source)
    }

    /// Set a value and its provenance, replacing anything already there
    pub fn set(
        &mut self,
        section: &str,
        option: &str,
        value: impl Into<String>,
        source: ConfigSource,
    ) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(option.to_string(), ConfigEntry::new(value, source));
    }

    /// Remove an entry from exactly this section, returning it
    pub fn remove(&mut self, section: &str, option: &str) -> Option<ConfigEntry> {
        let sect = self.sections.get_mut(section)?;
        let removed = sect.remove(option);
        if sect.is_empty() {
            self.sections.remove(section);
        }
        removed
    }

    /// Register built-in defaults. Existing entries (including `user`
    /// fallbacks) are never overwritten.
    pub fn apply_defaults<'a, I>(&mut self, section: &str, defaults: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (option, value) in defaults {
            if self.entry(section, option).is_none() {
                self.set(section, option, value, ConfigSource::Default);
            }
        }
    }

    /// Record values passed on the command line. `None` means the flag was
    /// not given and leaves the store alone.
    pub fn apply_arguments<'a, I>(&mut self, section: &str, arguments: I)
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        for (option, value) in arguments {
            if let Some(value) = value {
                self.set(section, option, value, ConfigSource::Argument);
            }
        }
    }

    /// Iterate over every `(section, option, entry)` in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ConfigEntry)> {
        self.sections.iter().flat_map(|(section, options)| {
            options
                .iter()
                .map(move |(option, entry)| (section.as_str(), option.as_str(), entry))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
