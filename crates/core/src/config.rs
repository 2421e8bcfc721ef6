use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::debug;

use crate::session::Session;

static DEFAULT_API_URL: &str = "http://localhost:5000/api";
static DEFAULT_USER_ID: &str = "user123";
static CONFIG_FILE_NAME: &str = "config.json";

pub static ENV_API_URL: &str = "PLANBOARD_API_URL";
pub static ENV_USER: &str = "PLANBOARD_USER";
pub static ENV_CONFIG: &str = "PLANBOARD_CONFIG";

const DEFAULT_REFRESH_SETTLE: Duration = Duration::from_millis(500);
const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(6);

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "planboard", "planboard"));

/// Values supplied explicitly by the caller (usually CLI flags). They win over everything.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub user_id: Option<String>,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_url: Option<String>,
    user_id: Option<String>,
    refresh_settle_ms: Option<u64>,
    toast_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    api_url: String,
    user_id: String,
    refresh_settle: Duration,
    toast_ttl: Duration,
    config_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            refresh_settle: DEFAULT_REFRESH_SETTLE,
            toast_ttl: DEFAULT_TOAST_TTL,
            config_path: None,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from overrides, the process environment, an optional
    /// config file, and built-in defaults, in that order of precedence.
    pub fn discover(overrides: ConfigOverrides) -> Result<Self> {
        Self::discover_with(overrides, |key| env::var(key).ok())
    }

    /// Same as [`AppConfig::discover`] with an injectable environment lookup.
    pub fn discover_with<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = overrides
            .config_path
            .clone()
            .or_else(|| lookup(ENV_CONFIG).map(PathBuf::from))
            .or_else(default_config_path);

        let file = match config_path.as_deref() {
            Some(path) if path.exists() => read_file_config(path)?,
            _ => FileConfig::default(),
        };

        let defaults = Self::default();
        let api_url = overrides
            .api_url
            .or_else(|| lookup(ENV_API_URL))
            .or(file.api_url)
            .unwrap_or(defaults.api_url);
        let user_id = overrides
            .user_id
            .or_else(|| lookup(ENV_USER))
            .or(file.user_id)
            .unwrap_or(defaults.user_id);

        let config = Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            user_id,
            refresh_settle: file
                .refresh_settle_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.refresh_settle),
            toast_ttl: file
                .toast_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.toast_ttl),
            config_path,
        };
        debug!(api_url = %config.api_url, user = %config.user_id, "resolved configuration");
        Ok(config)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn refresh_settle(&self) -> Duration {
        self.refresh_settle
    }

    pub fn toast_ttl(&self) -> Duration {
        self.toast_ttl
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn session(&self) -> Session {
        Session::new(self.user_id.clone())
    }

    pub fn with_refresh_settle(mut self, refresh_settle: Duration) -> Self {
        self.refresh_settle = refresh_settle;
        self
    }
}

fn default_config_path() -> Option<PathBuf> {
    PROJECT_DIRS
        .as_ref()
        .map(|project| project.config_dir().join(CONFIG_FILE_NAME))
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid config file at {}", path.display()))
}
