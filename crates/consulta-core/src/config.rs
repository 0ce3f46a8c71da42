//! Configuration management for the consultation console.
//!
//! Settings live in a TOML file under the per-user config directory and
//! can be overridden through `CONSULTA_*` environment variables.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lookup webhook used when no URL is configured.
pub const DEFAULT_GATEWAY_URL: &str =
    "https://santanacred-n8n-chatwoot.igxlaz.easypanel.host/webhook/consulta";

/// Console settings, stored as `config.toml`.
///
/// Every section has defaults, so a partial or absent file is fine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Lookup gateway settings
    pub gateway: GatewayConfig,
    /// Queue pacing and retry settings
    pub queue: QueueConfig,
    /// Persistence settings
    pub storage: StorageConfig,
    /// Listing and export settings
    pub export: ExportConfig,
}

impl AppConfig {
    /// Read `config.toml` at `config_path`.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Reading settings from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// [`AppConfig::load_from`], then environment overrides, then validation.
    ///
    /// Recognised variables:
    /// - `CONSULTA_GATEWAY_URL`: lookup webhook URL
    /// - `CONSULTA_GATEWAY_TIMEOUT_SECS`: gateway timeout
    /// - `CONSULTA_REQUEST_INTERVAL_MS`: minimum spacing between lookups
    /// - `CONSULTA_MAX_RETRIES`: cap on pending retries
    pub fn load_with_env(config_path: &Path) -> ConfigResult<Self> {
        let mut config = Self::load_from(config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `CONSULTA_*` environment overrides in place.
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CONSULTA_GATEWAY_URL") {
            tracing::debug!("Override gateway.url from env: {}", url);
            self.gateway.url = url;
        }

        if let Ok(val) = std::env::var("CONSULTA_GATEWAY_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.gateway.timeout_secs = secs;
                tracing::debug!("Override gateway.timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("CONSULTA_REQUEST_INTERVAL_MS") {
            if let Ok(ms) = val.parse() {
                self.queue.request_interval_ms = ms;
                tracing::debug!("Override queue.request_interval_ms from env: {}", ms);
            }
        }

        if let Ok(val) = std::env::var("CONSULTA_MAX_RETRIES") {
            if let Ok(retries) = val.parse() {
                self.queue.max_retries = retries;
                tracing::debug!("Override queue.max_retries from env: {}", retries);
            }
        }
    }

    /// Reject values the consultation loop cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.gateway.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "gateway.url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.gateway.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gateway.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.queue.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "queue.max_retries".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.export.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "export.page_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Write the settings as pretty TOML to `config_path`, creating parent
    /// directories as needed.
    pub fn save_to(&self, config_path: &Path) -> ConfigResult<()> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Writing settings to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// `config.toml` under the per-user config directory
    /// (`~/.config/consulta/` on Linux).
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Per-user data directory (`~/.local/share/consulta` on Linux).
    pub fn data_dir() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Full path of the record database inside the data directory.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        Ok(Self::data_dir()?.join(&self.storage.database_file))
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("br", "consulta", "consulta").ok_or(ConfigError::NoConfigDir)
}

/// Lookup gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Webhook URL receiving `{ "cpf": "<digits>" }` POSTs
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl GatewayConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GATEWAY_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("consulta/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Queue pacing and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Minimum gap between two gateway calls in milliseconds
    pub request_interval_ms: u64,
    /// Maximum automatic attempts for a record stuck in `pending`
    pub max_retries: u32,
}

impl QueueConfig {
    /// Inter-request floor as a `Duration`.
    #[must_use]
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            request_interval_ms: 3000,
            max_retries: 5,
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `SQLite` file name, relative to the data directory
    pub database_file: String,
    /// Key under which the record collection is stored
    pub records_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: "consulta.db".to_string(),
            records_key: "clients".to_string(),
        }
    }
}

/// Listing and export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Prefix of exported CSV file names
    pub file_prefix: String,
    /// Rows per page in listings
    pub page_size: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: "consulta-cpf".to_string(),
            page_size: 10,
        }
    }
}
