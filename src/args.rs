//! Command-line arguments.

use clap::{Parser, ValueEnum};
use dlren_config::Config;
use std::path::PathBuf;

/// Rename DLsite archives and folders from catalog metadata.
///
/// Finds `.zip` and `.rar` archives and folders whose names contain a product
/// code (RJ, VJ, BJ, RG or RE followed by 6 or 8 digits), looks each code up
/// in the catalog, shows the new names, and renames after confirmation.
/// Nothing is ever overwritten.
///
/// ## Examples
///
/// Preview only:
///   dlren --dry-run ~/Downloads
///
/// Custom template, subfolders included, no prompt:
///   dlren -r -y -t "[{id}] {title} ({cast})" ~/Downloads
#[derive(Parser, Debug)]
#[command(name = "dlren")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(required_unless_present = "placeholders")]
    pub directory: Option<PathBuf>,

    /// Scan subdirectories too
    #[arg(short, long)]
    pub recursive: bool,

    /// Naming template (see --placeholders)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Config file [default: <config dir>/dlren/config.toml, if present]
    #[arg(short, long, env = "DLREN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Rename without asking for confirmation
    #[arg(short = 'y', long, conflicts_with = "dry_run")]
    pub yes: bool,

    /// Look everything up and show the new names, but rename nothing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Log level for diagnostics on stderr (overridden by RUST_LOG)
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// List the placeholders, marking the ones the template uses, and exit
    #[arg(long)]
    pub placeholders: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(template) = &self.template {
            config.template = template.clone();
        }
        if self.recursive {
            config.recursive = true;
        }
    }
}

/// Log level argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
