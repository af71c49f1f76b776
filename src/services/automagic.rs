//! Directory-aware defaults for command handlers.
//!
//! [`automagic_keyboard`] and [`automagic_keymap`] wrap a handler so that,
//! before it runs, the `keyboard`/`keymap` option of the active subcommand is
//! filled in from the working directory whenever the user did not pass it
//! explicitly on the command line.
//!
//! ```ignore
//! let handler = automagic_keyboard(automagic_keymap(compile));
//! handler(&mut ctx)?;
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::error::ContextError;
use crate::domain::models::{ConfigSource, ConfigStore};
use crate::domain::ports::FirmwareTree;

/// Option name the keyboard decorator manages
pub const KEYBOARD: &str = "keyboard";

/// Option name the keymap decorator manages
pub const KEYMAP: &str = "keymap";

/// Everything a subcommand handler sees
pub struct CommandContext<'t> {
    subcommand: String,
    cwd: PathBuf,
    config: ConfigStore,
    tree: &'t dyn FirmwareTree,
}

impl<'t> CommandContext<'t> {
    pub fn new(
        subcommand: impl Into<String>,
        cwd: impl Into<PathBuf>,
        config: ConfigStore,
        tree: &'t dyn FirmwareTree,
    ) -> Self {
        Self {
            subcommand: subcommand.into(),
            cwd: cwd.into(),
            config,
            tree,
        }
    }

    /// Name of the subcommand being executed
    pub fn subcommand(&self) -> &str {
        &self.subcommand
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn tree(&self) -> &'t dyn FirmwareTree {
        self.tree
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn into_config(self) -> ConfigStore {
        self.config
    }

    /// Value of an option for the active subcommand
    pub fn get(&self, option: &str) -> Option<&str> {
        self.config.get(&self.subcommand, option)
    }

    /// Provenance of an option for the active subcommand
    pub fn source(&self, option: &str) -> Option<ConfigSource> {
        self.config.source(&self.subcommand, option)
    }

    /// Overwrite an option for the active subcommand
    pub fn set(&mut self, option: &str, value: impl Into<String>, source: ConfigSource) {
        self.config.set(&self.subcommand, option, value, source);
    }
}

impl std::fmt::Debug for CommandContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("subcommand", &self.subcommand)
            .field("cwd", &self.cwd)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Fill in `keyboard` for the active subcommand.
///
/// A value read from the config file is first mapped through
/// [`FirmwareTree::keyboard_folder`] so renamed keyboards keep working. Then,
/// unless `--keyboard` was passed, a keyboard detected from the working
/// directory replaces it.
pub fn apply_keyboard_context(ctx: &mut CommandContext<'_>) -> Result<(), ContextError> {
    if ctx.source(KEYBOARD) == Some(ConfigSource::ConfigFile) {
        if let Some(configured) = ctx.get(KEYBOARD).map(str::to_string) {
            let canonical = ctx.tree.keyboard_folder(&configured)?;
            if canonical != configured {
                debug!(
                    subcommand = ctx.subcommand(),
                    from = %configured,
                    to = %canonical,
                    "normalized configured keyboard"
                );
            }
            ctx.set(KEYBOARD, canonical, ConfigSource::ConfigFile);
        }
    }

    if ctx.source(KEYBOARD) != Some(ConfigSource::Argument) {
        if let Some(keyboard) = ctx.tree.find_keyboard_from_dir(&ctx.cwd) {
            debug!(subcommand = ctx.subcommand(), %keyboard, "keyboard detected from directory");
            ctx.set(KEYBOARD, keyboard, ConfigSource::KeyboardDirectory);
        }
    }

    Ok(())
}

/// Fill in `keymap` for the active subcommand.
///
/// Unless `--keymap` was passed, a keymap detected from a keymap, layout, or
/// userspace directory replaces the configured value. Configured keymap names
/// are used as-is.
pub fn apply_keymap_context(ctx: &mut CommandContext<'_>) -> Result<(), ContextError> {
    if ctx.source(KEYMAP) != Some(ConfigSource::Argument) {
        if let Some((keymap, origin)) = ctx.tree.find_keymap_from_dir(&ctx.cwd) {
            debug!(subcommand = ctx.subcommand(), %keymap, %origin, "keymap detected from directory");
            ctx.set(KEYMAP, keymap, origin.into());
        }
    }

    Ok(())
}

/// Wrap a handler so `keyboard` is resolved from the environment first.
///
/// Errors from resolving the configured keyboard are converted into the
/// handler's error type and the handler is not run.
pub fn automagic_keyboard<'t, T, E, F>(
    handler: F,
) -> impl Fn(&mut CommandContext<'t>) -> Result<T, E>
where
    F: Fn(&mut CommandContext<'t>) -> Result<T, E>,
    E: From<ContextError>,
{
    move |ctx: &mut CommandContext<'t>| {
        apply_keyboard_context(ctx)?;
        handler(ctx)
    }
}

/// Wrap a handler so `keymap` is resolved from the environment first.
pub fn automagic_keymap<'t, T, E, F>(handler: F) -> impl Fn(&mut CommandContext<'t>) -> Result<T, E>
where
    F: Fn(&mut CommandContext<'t>) -> Result<T, E>,
    E: From<ContextError>,
{
    move |ctx: &mut CommandContext<'t>| {
        apply_keymap_context(ctx)?;
        handler(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::KeymapOrigin;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// Scripted tree that records which lookups were made
    #[derive(Default)]
    struct FakeTree {
        keyboard: Option<String>,
        keymap: Option<(String, KeymapOrigin)>,
        aliases: HashMap<String, String>,
        invalid: Vec<String>,
        keyboard_lookups: Cell<u32>,
        keymap_lookups: Cell<u32>,
        canonicalized: RefCell<Vec<String>>,
    }

    impl FirmwareTree for FakeTree {
        fn find_keyboard_from_dir(&self, _cwd: &Path) -> Option<String> {
            self.keyboard_lookups.set(self.keyboard_lookups.get() + 1);
            self.keyboard.clone()
        }

        fn find_keymap_from_dir(&self, _cwd: &Path) -> Option<(String, KeymapOrigin)> {
            self.keymap_lookups.set(self.keymap_lookups.get() + 1);
            self.keymap.clone()
        }

        fn keyboard_folder(&self, keyboard: &str) -> Result<String, ContextError> {
            self.canonicalized.borrow_mut().push(keyboard.to_string());
            if self.invalid.iter().any(|k| k == keyboard) {
                return Err(ContextError::InvalidKeyboard(keyboard.to_string()));
            }
            Ok(self
                .aliases
                .get(keyboard)
                .cloned()
                .unwrap_or_else(|| keyboard.to_string()))
        }
    }

    fn store_with(option: &str, value: &str, source: ConfigSource) -> ConfigStore {
        let mut store = ConfigStore::new();
        store.set("compile", option, value, source);
        store
    }

    fn noop(_ctx: &mut CommandContext<'_>) -> Result<(), ContextError> {
        Ok(())
    }

    #[test]
    fn test_argument_keyboard_is_never_overridden() {
        let tree = FakeTree {
            keyboard: Some("planck/rev6".into()),
            ..FakeTree::default()
        };
        let store = store_with(KEYBOARD, "ergodox_ez", ConfigSource::Argument);
        let mut ctx = CommandContext::new("compile", "/qmk/keyboards/planck", store, &tree);

        automagic_keyboard(noop)(&mut ctx).unwrap();

        assert_eq!(ctx.get(KEYBOARD), Some("ergodox_ez"));
        assert_eq!(ctx.source(KEYBOARD), Some(ConfigSource::Argument));
        assert_eq!(tree.keyboard_lookups.get(), 0);
        assert!(tree.canonicalized.borrow().is_empty());
    }

    #[test]
    fn test_config_file_alias_is_canonicalized() {
        let tree = FakeTree {
            aliases: HashMap::from([("planck".to_string(), "planck/rev6".to_string())]),
            ..FakeTree::default()
        };
        let store = store_with(KEYBOARD, "planck", ConfigSource::ConfigFile);
        let mut ctx = CommandContext::new("compile", "/home/me", store, &tree);

        automagic_keyboard(noop)(&mut ctx).unwrap();

        assert_eq!(ctx.get(KEYBOARD), Some("planck/rev6"));
        assert_eq!(ctx.source(KEYBOARD), Some(ConfigSource::ConfigFile));
        assert_eq!(tree.keyboard_lookups.get(), 1);
    }

    #[test]
    fn test_directory_keyboard_wins_over_canonicalized_config() {
        let tree = FakeTree {
            keyboard: Some("ergodox_ez".into()),
            aliases: HashMap::from([("planck".to_string(), "planck/rev6".to_string())]),
            ..FakeTree::default()
        };
        let store = store_with(KEYBOARD, "planck", ConfigSource::ConfigFile);
        let mut ctx = CommandContext::new("compile", "/qmk/keyboards/ergodox_ez", store, &tree);

        automagic_keyboard(noop)(&mut ctx).unwrap();

        assert_eq!(*tree.canonicalized.borrow(), vec!["planck"]);
        assert_eq!(ctx.get(KEYBOARD), Some("ergodox_ez"));
        assert_eq!(ctx.source(KEYBOARD), Some(ConfigSource::KeyboardDirectory));
    }

    #[test]
    fn test_default_keyboard_is_not_canonicalized() {
        let tree = FakeTree::default();
        let store = store_with(KEYBOARD, "planck", ConfigSource::Default);
        let mut ctx = CommandContext::new("compile", "/", store, &tree);

        automagic_keyboard(noop)(&mut ctx).unwrap();

        assert!(tree.canonicalized.borrow().is_empty());
        assert_eq!(tree.keyboard_lookups.get(), 1);
        assert_eq!(ctx.source(KEYBOARD), Some(ConfigSource::Default));
    }

    #[test]
    fn test_missing_keyboard_is_detected() {
        let tree = FakeTree {
            keyboard: Some("planck/rev6".into()),
            ..FakeTree::default()
        };
        let mut ctx = CommandContext::new("info", "/qmk/keyboards/planck/rev6", ConfigStore::new(), &tree);

        automagic_keyboard(noop)(&mut ctx).unwrap();

        assert_eq!(ctx.get(KEYBOARD), Some("planck/rev6"));
        assert_eq!(ctx.source(KEYBOARD), Some(ConfigSource::KeyboardDirectory));
    }

    #[test]
    fn test_no_detection_is_a_noop() {
        let tree = FakeTree::default();
        let mut ctx = CommandContext::new("info", "/tmp", ConfigStore::new(), &tree);

        automagic_keyboard(noop)(&mut ctx).unwrap();

        assert!(ctx.config().is_empty());
    }

    #[test]
    fn test_invalid_configured_keyboard_stops_handler() {
        let tree = FakeTree {
            invalid: vec!["gone".into()],
            ..FakeTree::default()
        };
        let store = store_with(KEYBOARD, "gone", ConfigSource::ConfigFile);
        let mut ctx = CommandContext::new("compile", "/", store, &tree);
        let ran = Cell::new(false);

        let result = automagic_keyboard(|_ctx: &mut CommandContext<'_>| -> Result<(), ContextError> {
            ran.set(true);
            Ok(())
        })(&mut ctx);

        assert!(matches!(result, Err(ContextError::InvalidKeyboard(k)) if k == "gone"));
        assert!(!ran.get());
        assert_eq!(tree.keyboard_lookups.get(), 0);
    }

    #[test]
    fn test_keymap_detected_with_origin_tag() {
        for (origin, expected) in [
            (KeymapOrigin::Keymap, ConfigSource::KeymapDirectory),
            (KeymapOrigin::Layout, ConfigSource::LayoutDirectory),
            (KeymapOrigin::User, ConfigSource::UserDirectory),
        ] {
            let tree = FakeTree {
                keymap: Some(("mine".into(), origin)),
                ..FakeTree::default()
            };
            let store = store_with(KEYMAP, "default", ConfigSource::Default);
            let mut ctx = CommandContext::new("compile", "/qmk", store, &tree);

            automagic_keymap(noop)(&mut ctx).unwrap();

            assert_eq!(ctx.get(KEYMAP), Some("mine"));
            assert_eq!(ctx.source(KEYMAP), Some(expected));
        }
    }

    #[test]
    fn test_keymap_untouched_when_not_detected() {
        let tree = FakeTree::default();
        let store = store_with(KEYMAP, "via", ConfigSource::ConfigFile);
        let mut ctx = CommandContext::new("compile", "/qmk", store, &tree);

        automagic_keymap(noop)(&mut ctx).unwrap();

        assert_eq!(ctx.get(KEYMAP), Some("via"));
        assert_eq!(ctx.source(KEYMAP), Some(ConfigSource::ConfigFile));
        assert_eq!(tree.keymap_lookups.get(), 1);
    }

    #[test]
    fn test_keymap_config_value_is_not_canonicalized() {
        let tree = FakeTree::default();
        let store = store_with(KEYMAP, "via", ConfigSource::ConfigFile);
        let mut ctx = CommandContext::new("compile", "/qmk", store, &tree);

        automagic_keymap(noop)(&mut ctx).unwrap();

        assert!(tree.canonicalized.borrow().is_empty());
    }

    #[test]
    fn test_argument_keymap_is_never_overridden() {
        let tree = FakeTree {
            keymap: Some(("drashna".into(), KeymapOrigin::User)),
            ..FakeTree::default()
        };
        let store = store_with(KEYMAP, "via", ConfigSource::Argument);
        let mut ctx = CommandContext::new("compile", "/qmk/users/drashna", store, &tree);

        automagic_keymap(noop)(&mut ctx).unwrap();

        assert_eq!(ctx.get(KEYMAP), Some("via"));
        assert_eq!(tree.keymap_lookups.get(), 0);
    }

    #[test]
    fn test_wrapped_handler_sees_resolved_values_and_returns_through() {
        let tree = FakeTree {
            keyboard: Some("planck/rev6".into()),
            keymap: Some(("default".into(), KeymapOrigin::Keymap)),
            ..FakeTree::default()
        };
        let mut ctx = CommandContext::new(
            "compile",
            "/qmk/keyboards/planck/rev6/keymaps/default",
            ConfigStore::new(),
            &tree,
        );

        let handler = automagic_keyboard(automagic_keymap(
            |ctx: &mut CommandContext<'_>| -> Result<String, ContextError> {
                Ok(format!(
                    "{}:{}",
                    ctx.get(KEYBOARD).unwrap_or("?"),
                    ctx.get(KEYMAP).unwrap_or("?")
                ))
            },
        ));

        assert_eq!(handler(&mut ctx).unwrap(), "planck/rev6:default");
        // Reusable like any function
        assert_eq!(handler(&mut ctx).unwrap(), "planck/rev6:default");
    }

    #[test]
    fn test_only_active_subcommand_is_mutated() {
        let tree = FakeTree {
            keyboard: Some("planck/rev6".into()),
            ..FakeTree::default()
        };
        let mut store = ConfigStore::new();
        store.set("flash", KEYBOARD, "ergodox_ez", ConfigSource::Default);
        let mut ctx = CommandContext::new("compile", "/qmk", store, &tree);

        automagic_keyboard(noop)(&mut ctx).unwrap();

        let config = ctx.into_config();
        assert_eq!(config.get("flash", KEYBOARD), Some("ergodox_ez"));
        assert_eq!(config.get("compile", KEYBOARD), Some("planck/rev6"));
    }
}
