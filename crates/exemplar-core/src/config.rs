//! Configuration for exemplar runs.
//!
//! Settings are stored in TOML. Every field has a default, so a missing file
//! or a file with only some sections is valid. Command-line flags override
//! whatever is loaded here.
//!
//! ## Lookup order
//!
//! 1. An explicit path (the CLI's `--config`)
//! 2. The `EXEMPLAR_CONFIG` environment variable
//! 3. `config.toml` in the platform config directory:
//!    - Linux: `~/.config/exemplar/config.toml`
//!    - macOS: `~/Library/Application Support/exemplar/config.toml`
//!    - Windows: `%APPDATA%\exemplar\config\config.toml`
//!
//! An explicitly named file must exist; the platform default may be absent.
//!
//! ## Example
//!
//! ```toml
//! [ledger]
//! path = "/srv/exemplar/examples.db"
//! on_duplicate = "reject"
//!
//! [validation]
//! concurrency = 8
//! timeout_secs = 120
//! command = "go"
//! args = ["vet", "{file}"]
//!
//! [docs]
//! go = "https://pkg.go.dev/github.com/Azure/azure-sdk-for-go/{package}@{version}"
//! ```
//!
//! ```rust
//! use exemplar_core::{Config, DuplicatePolicy};
//!
//! let config: Config = toml::from_str("[ledger]\non_duplicate = \"replace\"\n")?;
//! assert_eq!(config.ledger.on_duplicate, DuplicatePolicy::Replace);
//! assert_eq!(config.validation.concurrency, 4);
//! # Ok::<(), toml::de::Error>(())
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::DuplicatePolicy;
use crate::{Dialect, Error, Result};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "EXEMPLAR_CONFIG";

const CONFIG_FILE_NAME: &str = "config.toml";
const LEDGER_FILE_NAME: &str = "examples.db";
const DEFAULT_CONCURRENCY: usize = 4;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[ledger]` section.
    pub ledger: LedgerConfig,
    /// `[validation]` section.
    pub validation: ValidationConfig,
    /// `[docs]` section.
    pub docs: DocsConfig,
}

/// Where releases are recorded and how re-runs are treated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// SQLite ledger file.
    ///
    /// Defaults to `examples.db` in the platform data directory.
    pub path: PathBuf,
    /// Policy for a release that is already recorded.
    pub on_duplicate: DuplicatePolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
            on_duplicate: DuplicatePolicy::default(),
        }
    }
}

/// Validation oracle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum number of files processed (and validated) at once.
    pub concurrency: usize,
    /// Per-unit time limit for the validation command.
    pub timeout_secs: Option<u64>,
    /// Program run for every candidate. Everything is accepted when unset.
    pub command: Option<String>,
    /// Program arguments; `{file}` and `{dir}` are substituted.
    pub args: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: None,
            command: None,
            args: Vec::new(),
        }
    }
}

/// Documentation link template overrides, one per dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Go link template.
    pub go: Option<String>,
    /// JavaScript link template.
    pub js: Option<String>,
    /// Java link template.
    pub java: Option<String>,
}

impl DocsConfig {
    /// The override for `dialect`, if one is configured.
    pub fn link_template(&self, dialect: Dialect) -> Option<&str> {
        match dialect {
            Dialect::Go => self.go.as_deref(),
            Dialect::JavaScript => self.js.as_deref(),
            Dialect::Java => self.java.as_deref(),
        }
    }
}

impl Config {
    /// Load configuration following the lookup order described above.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when an explicitly named file is missing, or
    /// when any located file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match resolve_path(explicit, std::env::var_os(CONFIG_ENV)) {
            Some(ConfigLocation::Required(path)) => Self::load_from(&path),
            Some(ConfigLocation::Optional(path)) if path.exists() => Self::load_from(&path),
            Some(ConfigLocation::Optional(_)) | None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Platform default location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    fn validate(&self) -> Result<()> {
        if self.validation.concurrency == 0 {
            return Err(Error::Config(
                "validation.concurrency must be at least 1".to_string(),
            ));
        }
        if self.validation.command.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(Error::Config("validation.command must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigLocation {
    Required(PathBuf),
    Optional(PathBuf),
}

fn resolve_path(explicit: Option<&Path>, env: Option<OsString>) -> Option<ConfigLocation> {
    if let Some(path) = explicit {
        return Some(ConfigLocation::Required(path.to_path_buf()));
    }
    if let Some(value) = env.filter(|v| !v.is_empty()) {
        return Some(ConfigLocation::Required(PathBuf::from(value)));
    }
    Config::default_path().map(ConfigLocation::Optional)
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "exemplar")
}

fn default_ledger_path() -> PathBuf {
    project_dirs().map_or_else(
        || PathBuf::from(LEDGER_FILE_NAME),
        |dirs| dirs.data_dir().join(LEDGER_FILE_NAME),
    )
}
