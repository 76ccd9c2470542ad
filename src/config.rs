//! Application configuration.
//!
//! Settings are layered with `figment`, later layers winning:
//!
//! 1. [`Config::default`]
//! 2. `config.toml` in the platform config folder
//!    (`~/.config/photosort/config.toml` on Linux)
//! 3. `PHOTOSORT_*` environment variables, e.g. `PHOTOSORT_BY_MONTH=true`
//! 4. CLI flags (applied by the command handlers)
//!
//! ```toml
//! compare = ["binary"]
//! by_month = true
//! store_name = "files.txt"
//! permanent_delete = false
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_STORE_NAME;

/// Default HTML duplicate report name inside the scanned folder.
pub const DEFAULT_REPORT_NAME: &str = "duplicate_report.html";

/// Prefix of environment variables read by [`Config::load`].
pub const ENV_PREFIX: &str = "PHOTOSORT_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Comparison strategies used by `ingest` when `-c` is not given.
    pub compare: Vec<String>,
    /// Lay the library out as `YYYY/MM/`.
    pub by_month: bool,
    /// Mapping store file name inside the library.
    pub store_name: String,
    /// HTML duplicate report file name.
    pub report_name: String,
    /// Delete permanently instead of moving to the trash.
    pub permanent_delete: bool,
    /// Walk source subfolders.
    pub recursive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compare: vec!["binary".to_string()],
            by_month: false,
            store_name: DEFAULT_STORE_NAME.to_string(),
            report_name: DEFAULT_REPORT_NAME.to_string(),
            permanent_delete: false,
            recursive: true,
        }
    }
}

impl Config {
    /// Load the layered configuration, falling back to defaults if any
    /// layer is malformed.
    #[must_use]
    pub fn load() -> Self {
        match Self::figment(Self::config_path().as_deref()).extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring invalid configuration: {e}");
                Self::default()
            }
        }
    }

    /// The provider stack: defaults, then `file` (if any), then environment.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Platform config file location, if a home folder can be found.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "photosort", "photosort")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
