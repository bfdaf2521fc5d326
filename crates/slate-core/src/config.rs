use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ErrorCode;

/// Directory under the project root that holds slate state.
pub const SLATE_DIR: &str = ".slate";
/// Project config file name inside [`SLATE_DIR`].
pub const CONFIG_FILE: &str = "config.toml";
/// SQLite store file name inside [`SLATE_DIR`].
pub const STORE_FILE: &str = "slate.db";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::InternalUnexpected,
            Self::Parse { .. } => ErrorCode::ConfigParseError,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub plan: PlanConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl SyncConfig {
    /// Debounce delay of the synchronizer. Zero is treated as one millisecond.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.max(1))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default = "default_graduation_credits")]
    pub graduation_credits: u32,
    #[serde(default = "default_max_course_credits")]
    pub max_course_credits: u32,
    #[serde(default = "default_true")]
    pub seed_catalog: bool,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            graduation_credits: default_graduation_credits(),
            max_course_credits: default_max_course_credits(),
            seed_catalog: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

#[must_use]
pub fn slate_dir(project_root: &Path) -> PathBuf {
    project_root.join(SLATE_DIR)
}

#[must_use]
pub fn store_path(project_root: &Path) -> PathBuf {
    slate_dir(project_root).join(STORE_FILE)
}

#[must_use]
pub fn config_path(project_root: &Path) -> PathBuf {
    slate_dir(project_root).join(CONFIG_FILE)
}

fn read_toml<T>(path: &Path) -> Result<Option<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str::<T>(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Load `<root>/.slate/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig, ConfigError> {
    Ok(read_toml(&config_path(project_root))?.unwrap_or_default())
}

/// Load the per-user config from the platform config directory.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig, ConfigError> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    Ok(read_toml(&config_dir.join("slate").join(CONFIG_FILE))?.unwrap_or_default())
}

/// Merge project config, user config, flags, and environment into one view.
///
/// # Errors
///
/// Returns [`ConfigError`] if either config file is malformed.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig, ConfigError> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("SLATE_FORMAT")
        .ok()
        .or_else(|| env::var("FORMAT").ok());
    let resolved_output = resolve_output(cli_json, user.output.as_deref(), env_format.as_deref());

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

/// Render `config` as the TOML written by `slate init`.
///
/// # Errors
///
/// Fails only if serialization of the config types fails.
pub fn render_project_config(config: &ProjectConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

fn resolve_output(cli_json: bool, user_output: Option<&str>, env_format: Option<&str>) -> String {
    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_true() -> bool {
    true
}

const fn default_debounce_ms() -> u64 {
    1000
}

const fn default_graduation_credits() -> u32 {
    120
}

const fn default_max_course_credits() -> u32 {
    crate::model::course::DEFAULT_MAX_CREDITS
}
