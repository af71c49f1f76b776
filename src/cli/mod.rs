//! Command-line interface
//!
//! Parses arguments, loads the config file, locates the firmware tree and
//! dispatches to a subcommand handler.

pub mod commands;
pub mod display;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::domain::models::{ConfigStore, USER_SECTION};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::firmware::FsFirmwareTree;

pub use types::{Cli, Commands};

/// Config option naming the firmware checkout
pub const QMK_HOME_OPTION: &str = "qmk_home";

/// Run the parsed command line from the process working directory
pub fn run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    run_in(cli, &cwd)
}

/// Run the parsed command line as if started from `cwd`
pub fn run_in(cli: &Cli, cwd: &Path) -> Result<()> {
    let config_path = cli.config_file.clone().or_else(ConfigLoader::default_path);
    let config = match &config_path {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ConfigStore::new(),
    };
    debug!(command = cli.command.name(), cwd = %cwd.display(), "dispatching");

    match &cli.command {
        Commands::Config(args) => {
            commands::config::execute(args, config, config_path.as_deref(), cli.json)
        }
        Commands::Resolve(args) => {
            let tree = open_tree(cli.qmk_home.as_deref(), &config, cwd)?;
            commands::resolve::execute(args, config, cwd, &tree, cli.json)
        }
        Commands::Info(args) => {
            let tree = open_tree(cli.qmk_home.as_deref(), &config, cwd)?;
            commands::info::execute(args, config, cwd, &tree, cli.json)
        }
        Commands::ListKeymaps(args) => {
            let tree = open_tree(cli.qmk_home.as_deref(), &config, cwd)?;
            commands::list_keymaps::execute(args, config, cwd, &tree, cli.json)
        }
        Commands::ListKeyboards => {
            let tree = open_tree(cli.qmk_home.as_deref(), &config, cwd)?;
            commands::list_keyboards::execute(&tree, cli.json)
        }
    }
}

/// Locate the firmware tree: `--qmk-home`/`QMK_HOME`, then `user.qmk_home`,
/// then the nearest checkout above `cwd`, then `~/qmk_firmware`.
pub fn open_tree(qmk_home: Option<&Path>, config: &ConfigStore, cwd: &Path) -> Result<FsFirmwareTree> {
    let explicit = qmk_home
        .map(Path::to_path_buf)
        .or_else(|| config.get(USER_SECTION, QMK_HOME_OPTION).map(PathBuf::from));

    let tree = FsFirmwareTree::locate(explicit.as_deref(), cwd)?;
    debug!(root = %tree.root().display(), "using firmware tree");
    Ok(tree)
}

/// Report a failed command and exit with status 1
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", console::style("Error:").red().bold());
    }
    std::process::exit(1)
}
