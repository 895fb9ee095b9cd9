//! Application configuration management.
//!
//! Handles loading, saving, and accessing the backend endpoint, the anon
//! key, collection names and logging preferences. Configuration is
//! persisted as TOML on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::constants::{self, collections};
use crate::error::{ScError, ScResult};
use crate::platform::Platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend endpoint and credentials.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Table and bucket names.
    #[serde(default)]
    pub collections: CollectionsConfig,

    /// Session handling.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL (e.g., "https://abcd.supabase.co").
    #[serde(default)]
    pub url: String,

    /// Public anon key sent as `apikey` on every request.
    #[serde(default)]
    pub anon_key: String,

    /// Timeout for record and auth requests, in milliseconds.
    #[serde(default = "default_api_timeout")]
    pub api_timeout_ms: u64,

    /// Timeout for object uploads, in milliseconds.
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_ms: u64,

    /// Accept invalid TLS certificates (local development stacks only).
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Names of the remote collections and the media bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsConfig {
    #[serde(default = "default_offerings_table")]
    pub offerings: String,

    #[serde(default = "default_media_items_table")]
    pub media_items: String,

    #[serde(default = "default_contact_messages_table")]
    pub contact_messages: String,

    /// Object bucket holding gallery images.
    #[serde(default = "default_media_bucket")]
    pub media_bucket: String,
}

/// Session handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Refresh the access token in the background before it expires.
    #[serde(default = "default_true")]
    pub auto_refresh: bool,

    /// How long before expiry the refresh is attempted, in seconds.
    #[serde(default = "default_refresh_margin")]
    pub refresh_margin_secs: u64,

    /// Persist the session between CLI invocations.
    #[serde(default = "default_true")]
    pub persist_session: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output in the log file.
    #[serde(default)]
    pub json_output: bool,
}

// Default value functions for serde

fn default_api_timeout() -> u64 {
    constants::DEFAULT_API_TIMEOUT_MS
}

fn default_upload_timeout() -> u64 {
    constants::DEFAULT_UPLOAD_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

fn default_refresh_margin() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_offerings_table() -> String {
    collections::OFFERINGS.to_string()
}

fn default_media_items_table() -> String {
    collections::MEDIA_ITEMS.to_string()
}

fn default_contact_messages_table() -> String {
    collections::CONTACT_MESSAGES.to_string()
}

fn default_media_bucket() -> String {
    collections::MEDIA_BUCKET.to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            api_timeout_ms: default_api_timeout(),
            upload_timeout_ms: default_upload_timeout(),
            accept_invalid_certs: false,
        }
    }
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            offerings: default_offerings_table(),
            media_items: default_media_items_table(),
            contact_messages: default_contact_messages_table(),
            media_bucket: default_media_bucket(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            refresh_margin_secs: default_refresh_margin(),
            persist_session: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> ScResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> ScResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> ScResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ScError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> ScResult<PathBuf> {
        Ok(Platform::config_dir()?.join("config.toml"))
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> ScResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Ok(Platform::data_dir()?.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Check whether the backend endpoint and key are configured.
    pub fn is_backend_configured(&self) -> bool {
        !self.backend.url.trim().is_empty() && !self.backend.anon_key.trim().is_empty()
    }

    /// Fail with `MissingConfig` naming the first absent backend setting.
    pub fn require_backend(&self) -> ScResult<()> {
        if self.backend.url.trim().is_empty() {
            return Err(ScError::MissingConfig("backend.url".into()));
        }
        if self.backend.anon_key.trim().is_empty() {
            return Err(ScError::MissingConfig("backend.anon_key".into()));
        }
        Ok(())
    }

    /// Sanitize and normalize a backend URL.
    ///
    /// Strips quotes and trailing slashes, and adds `https://` unless the
    /// host is a local development address.
    pub fn sanitize_backend_url(url: &str) -> String {
        let trimmed = url.trim().trim_matches('"').trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
            format!("http://{trimmed}")
        } else {
            format!("https://{trimmed}")
        };

        with_scheme.trim_end_matches('/').to_string()
    }
}

/// Thread-safe configuration holder for shared access across services.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Create a new configuration handle.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Read the configuration.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.read().await
    }

    /// Write/update the configuration.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, AppConfig> {
        self.inner.write().await
    }
}
