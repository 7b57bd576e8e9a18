//! Configuration for dlren.
//!
//! Values are layered, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A TOML file: the one passed explicitly, otherwise `config.toml` in the
//!    platform config directory (e.g. `~/.config/dlren/config.toml`) if it
//!    exists.
//! 3. Environment variables prefixed with `DLREN_`. Nested keys are separated
//!    by a double underscore: `DLREN_LOOKUP__TIMEOUT_SECS=10`.
//!
//! Command-line flags are applied on top by the binary.
//!
//! ```toml
//! template = "[{id}] {title}"
//! recursive = true
//!
//! [lookup]
//! timeout_secs = 10
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use dlren_catalog::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};
use dlren_library::{DEFAULT_TEMPLATE, NameTemplate};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "DLREN_";
const FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Naming template for renamed entries.
    pub template: String,
    /// Scan subdirectories too.
    pub recursive: bool,
    pub lookup: LookupConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self { template: DEFAULT_TEMPLATE.to_string(), recursive: false, lookup: LookupConfig::default() }
    }
}

/// Settings for the catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Location of the config file used when none is given explicitly.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dlren").map(|dirs| dirs.config_dir().join(FILE_NAME))
    }

    /// Loads and validates the configuration.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        let config = Self::figment(file.as_deref()).extract::<Self>().map_err(|e| ErrorKind::Parse(e.to_string()))?;
        tracing::debug!(file = ?file, ?config, "configuration loaded");
        config.validate()?;
        Ok(config)
    }

    /// The layered provider behind [`load`](Self::load).
    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match file {
            Some(file) => figment.merge(Toml::file(file)),
            None => figment,
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.template.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("template must not be empty"));
        }
        if self.lookup.endpoint.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("lookup endpoint must not be empty"));
        }
        if self.lookup.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("lookup timeout must be at least one second"));
        }
        Ok(())
    }

    /// The configured template, parsed.
    pub fn name_template(&self) -> Result<NameTemplate> {
        self.template.parse::<NameTemplate>().or_raise(|| ErrorKind::Invalid("template must not be empty"))
    }
}
