//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::infrastructure::logging::{LogConfig, LogFormat};

#[derive(Parser, Debug)]
#[command(name = "qmkctx")]
#[command(about = "Resolve QMK keyboard and keymap context from where you stand", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Config file to read and write instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Path to the qmk_firmware checkout
    #[arg(long, global = true, env = "QMK_HOME", value_name = "PATH")]
    pub qmk_home: Option<PathBuf>,

    /// Log level for stderr output
    #[arg(
        long,
        global = true,
        default_value = "warn",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Also write JSON logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            format: self.log_format,
            log_file: self.log_file.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the keyboard and keymap this directory resolves to
    Resolve(ResolveArgs),

    /// Show a keyboard's folder and keymaps
    Info(KeyboardArgs),

    /// List the keymaps available to a keyboard
    ListKeymaps(KeyboardArgs),

    /// List every keyboard in the firmware tree
    ListKeyboards,

    /// Read and write configuration values
    Config(ConfigArgs),
}

impl Commands {
    /// Config section this subcommand reads its options from
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Resolve(_) => "resolve",
            Self::Info(_) => "info",
            Self::ListKeymaps(_) => "list-keymaps",
            Self::ListKeyboards => "list-keyboards",
            Self::Config(_) => "config",
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Keyboard to use instead of the detected one
    #[arg(short, long)]
    pub keyboard: Option<String>,

    /// Keymap to use instead of the detected one
    #[arg(short = 'm', long)]
    pub keymap: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct KeyboardArgs {
    /// Keyboard to use instead of the detected one
    #[arg(short, long)]
    pub keyboard: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// `section.option` to read, `section.option=value` to write, `=None` to remove
    #[arg(value_name = "ENTRY")]
    pub entries: Vec<String>,
}
