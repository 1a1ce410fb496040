//! Application configuration: the TOML file with API settings and,
//! optionally, TVDB credentials.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tvdb_api::{API_KEY_LABEL, CredentialSource, USER_KEY_LABEL, USER_NAME_LABEL};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// API connection settings.
    #[serde(default)]
    pub tvdb: TvdbConfig,
    /// Login secrets. Lower precedence than command-line flags.
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// API connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TvdbConfig {
    /// Base URL override (default: `https://api.thetvdb.com`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Timeout of a single login attempt in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_timeout_secs: Option<u64>,
}

impl TvdbConfig {
    /// Per-request timeout, falling back to [`tvdb_api::DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map_or(tvdb_api::DEFAULT_TIMEOUT, Duration::from_secs)
    }

    /// Login attempt timeout, if configured.
    #[must_use]
    pub fn auth_timeout(&self) -> Option<Duration> {
        self.auth_timeout_secs.map(Duration::from_secs)
    }
}

/// Credentials stored in the config file.
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CredentialsConfig {
    /// TVDB API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// TVDB user key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_key: Option<String>,
    /// TVDB user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("user_key", &self.user_key.as_ref().map(|_| "<redacted>"))
            .field("user_name", &self.user_name)
            .finish()
    }
}

impl CredentialSource for CredentialsConfig {
    fn resolve(&self, label: &str) -> Option<String> {
        match label {
            API_KEY_LABEL => self.api_key.clone(),
            USER_KEY_LABEL => self.user_key.clone(),
            USER_NAME_LABEL => self.user_name.clone(),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}

/// Directory name under the user config directory.
const APP_DIR: &str = "tvdb";

/// Config file name.
const CONFIG_FILE: &str = "config.toml";

/// Resolves the config file path.
///
/// - `{dir}/config.toml` if `dir` is given.
/// - `$XDG_CONFIG_HOME/tvdb/config.toml` if that variable holds an absolute path.
/// - `~/.config/tvdb/config.toml` otherwise.
///
/// # Errors
///
/// Returns an error if neither `dir`, `XDG_CONFIG_HOME` nor `HOME` is usable.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    config_path_from(
        dir,
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

/// Path resolution with the environment passed in.
fn config_path_from(
    dir: Option<&PathBuf>,
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }

    // Relative values are invalid per the XDG base directory rules.
    let xdg = xdg_config_home
        .map(PathBuf::from)
        .filter(|p| p.is_absolute());
    if let Some(base) = xdg {
        return Ok(base.join(APP_DIR).join(CONFIG_FILE));
    }

    let home = home
        .filter(|h| !h.is_empty())
        .context("neither XDG_CONFIG_HOME nor HOME is set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join(APP_DIR)
        .join(CONFIG_FILE))
}
