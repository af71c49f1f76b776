//! Filesystem-backed view of a `qmk_firmware` checkout.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use super::aliases::{load_alias_table, resolve_alias, AliasTable};
use crate::adapters::cache::{timed_lru_cache, CacheInfo, CacheOptions, CachedFn};
use crate::domain::error::ContextError;
use crate::domain::models::{KeyboardInfo, KeymapOrigin};
use crate::domain::ports::FirmwareTree;

/// How long directory scans and the alias table stay cached
pub const SCAN_CACHE_TIMEOUT: Duration = Duration::from_secs(60);

type AliasLoader = fn((PathBuf,)) -> Result<Arc<AliasTable>, ContextError>;
type KeyboardScanner = fn((PathBuf,)) -> Arc<Vec<String>>;

/// A firmware checkout on disk
pub struct FsFirmwareTree {
    root: PathBuf,
    aliases: CachedFn<(PathBuf,), Arc<AliasTable>, AliasLoader>,
    keyboards: CachedFn<(PathBuf,), Arc<Vec<String>>, KeyboardScanner>,
}

fn scan_cache_options() -> CacheOptions {
    CacheOptions::new()
        .timeout(SCAN_CACHE_TIMEOUT)
        .maxsize(Some(1))
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn has_keyboard_marker(dir: &Path) -> bool {
    dir.join("rules.mk").is_file() || dir.join("keyboard.json").is_file()
}

/// A directory holding a `keymap.c` or `keymap.json`
pub fn is_keymap_dir(dir: &Path) -> bool {
    dir.join("keymap.c").is_file() || dir.join("keymap.json").is_file()
}

fn scan_keyboards((root,): (PathBuf,)) -> Arc<Vec<String>> {
    fn walk(dir: &Path, prefix: &mut Vec<String>, found: &mut Vec<String>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if !path.is_dir() || name == "keymaps" {
                continue;
            }
            prefix.push(name);
            if has_keyboard_marker(&path) {
                found.push(prefix.join("/"));
            }
            walk(&path, prefix, found);
            prefix.pop();
        }
    }

    let mut found = Vec::new();
    walk(&root.join("keyboards"), &mut Vec::new(), &mut found);
    found.sort();
    debug!(root = %root.display(), keyboards = found.len(), "scanned keyboards");
    Arc::new(found)
}

impl FsFirmwareTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_cache_options(root, scan_cache_options())
    }

    /// Build with custom cache settings for the alias table and keyboard scan
    pub fn with_cache_options(root: impl Into<PathBuf>, options: CacheOptions) -> Self {
        let root = canonical(&root.into());
        Self {
            aliases: timed_lru_cache(options.clone(), load_alias_table as AliasLoader),
            keyboards: timed_lru_cache(options, scan_keyboards as KeyboardScanner),
            root,
        }
    }

    /// A firmware root has both `keyboards/` and `quantum/`
    pub fn is_firmware_root(path: &Path) -> bool {
        path.join("keyboards").is_dir() && path.join("quantum").is_dir()
    }

    /// Nearest firmware root at or above `start`
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|p| Self::is_firmware_root(p))
            .map(Path::to_path_buf)
    }

    /// Pick the firmware root for this invocation.
    ///
    /// An explicit home must itself be a root. Otherwise search upward from
    /// `cwd`, then try `~/qmk_firmware`.
    pub fn locate(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ContextError> {
        if let Some(home) = explicit {
            return if Self::is_firmware_root(home) {
                Ok(Self::new(home))
            } else {
                Err(ContextError::FirmwareRootNotFound(home.to_path_buf()))
            };
        }

        Self::discover(cwd)
            .or_else(|| {
                dirs::home_dir()
                    .map(|home| home.join("qmk_firmware"))
                    .filter(|p| Self::is_firmware_root(p))
            })
            .map(Self::new)
            .ok_or_else(|| ContextError::FirmwareRootNotFound(cwd.to_path_buf()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder of a keyboard name, whether or not it exists
    pub fn keyboard_dir(&self, keyboard: &str) -> PathBuf {
        keyboard
            .split('/')
            .fold(self.root.join("keyboards"), |dir, part| dir.join(part))
    }

    /// Whether `keyboards/<name>` is a buildable keyboard folder
    pub fn is_keyboard(&self, keyboard: &str) -> bool {
        let well_formed = !keyboard.is_empty()
            && keyboard
                .split('/')
                .all(|part| !part.is_empty() && part != "." && part != "..");
        well_formed && has_keyboard_marker(&self.keyboard_dir(keyboard))
    }

    /// Every keyboard in the tree, sorted. Cached.
    pub fn list_keyboards(&self) -> Arc<Vec<String>> {
        self.keyboards.call((self.root.clone(),))
    }

    /// Keymaps found in any `keymaps/` folder along the keyboard's path
    pub fn list_keymaps(&self, keyboard: &str) -> Vec<String> {
        let mut names = BTreeSet::new();
        let mut dir = self.root.join("keyboards");

        for part in keyboard.split('/') {
            dir.push(part);
            let Ok(entries) = fs::read_dir(dir.join("keymaps")) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() && is_keymap_dir(&path) {
                    names.insert(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }

        names.into_iter().collect()
    }

    /// Resolve aliases and describe the keyboard
    pub fn keyboard_info(&self, keyboard: &str) -> Result<KeyboardInfo, ContextError> {
        let name = self.keyboard_folder(keyboard)?;
        Ok(KeyboardInfo {
            path: self.keyboard_dir(&name),
            keymaps: self.list_keymaps(&name),
            name,
        })
    }

    pub fn alias_cache_info(&self) -> CacheInfo {
        self.aliases.cache_info()
    }

    pub fn keyboard_cache_info(&self) -> CacheInfo {
        self.keyboards.cache_info()
    }

    /// Path components of `cwd` below the root, or `None` when outside it
    fn relative_parts(&self, cwd: &Path) -> Option<Vec<String>> {
        let cwd = canonical(cwd);
        let relative = cwd.strip_prefix(&self.root).ok()?;
        Some(
            relative
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect(),
        )
    }
}

impl FirmwareTree for FsFirmwareTree {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn find_keyboard_from_dir(&self, cwd: &Path) -> Option<String> {
        let parts = self.relative_parts(cwd)?;
        if parts.len() < 2 || parts[0] != "keyboards" {
            return None;
        }

        let mut rest = &parts[1..];
        if let Some(idx) = rest.iter().position(|p| p == "keymaps") {
            rest = &rest[..idx];
        }

        let name = rest.join("/");
        self.is_keyboard(&name).then_some(name)
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn find_keymap_from_dir(&self, cwd: &Path) -> Option<(String, KeymapOrigin)> {
        let parts = self.relative_parts(cwd)?;
        if parts.len() < 2 {
            return None;
        }

        match parts[0].as_str() {
            // keyboards/<kb>/keymaps/<name> at the shallowest
            "keyboards" if parts.len() > 3 => {
                let rest = &parts[1..];
                if rest.last().is_some_and(|p| p == "keymaps") {
                    return None;
                }
                let idx = rest
                    .iter()
                    .rposition(|p| p == "keymaps")
                    .filter(|&idx| idx > 0)?;
                rest.get(idx + 1)
                    .map(|name| (name.clone(), KeymapOrigin::Keymap))
            }
            "layouts" if parts.len() > 2 && is_keymap_dir(&canonical(cwd)) => parts
                .last()
                .map(|name| (name.clone(), KeymapOrigin::Layout)),
            "users" => Some((parts[1].clone(), KeymapOrigin::User)),
            _ => None,
        }
    }

    fn keyboard_folder(&self, keyboard: &str) -> Result<String, ContextError> {
        let aliases = self.aliases.try_call((self.root.clone(),))?;
        let resolved = resolve_alias(&aliases, keyboard)?;

        if self.is_keyboard(&resolved) {
            Ok(resolved)
        } else {
            Err(ContextError::InvalidKeyboard(resolved))
        }
    }
}

impl std::fmt::Debug for FsFirmwareTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsFirmwareTree")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
