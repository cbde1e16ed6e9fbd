//! Configuration management for ledgerlink
//!
//! This module handles loading, validation, and management of
//! ledgerlink configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Remote API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Paginated entry listing (POST, JSON)
    #[serde(default = "default_filter_endpoint")]
    pub filter_endpoint: String,
    /// CSV export (POST, JSON body, text response)
    #[serde(default = "default_export_endpoint")]
    pub export_endpoint: String,
    /// Entry submission (POST, multipart)
    #[serde(default = "default_upload_endpoint")]
    pub upload_endpoint: String,
    /// Category suggestions
    #[serde(default = "default_category_endpoint")]
    pub category_autocomplete_endpoint: String,
    /// Description suggestions
    #[serde(default = "default_description_endpoint")]
    pub description_autocomplete_endpoint: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            filter_endpoint: default_filter_endpoint(),
            export_endpoint: default_export_endpoint(),
            upload_endpoint: default_upload_endpoint(),
            category_autocomplete_endpoint: default_category_endpoint(),
            description_autocomplete_endpoint: default_description_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_filter_endpoint() -> String {
    "http://localhost:8080/api/entries/filter".to_string()
}

fn default_export_endpoint() -> String {
    "http://localhost:8080/api/entries/export".to_string()
}

fn default_upload_endpoint() -> String {
    "http://localhost:8080/api/entries/upload".to_string()
}

fn default_category_endpoint() -> String {
    "http://localhost:8080/api/autocomplete/category".to_string()
}

fn default_description_endpoint() -> String {
    "http://localhost:8080/api/autocomplete/description".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Login credentials the client accepts
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub username: String,
    /// argon2 PHC string
    #[serde(default)]
    pub password_hash: String,
}

/// Session storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File holding the login flag and session password
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { path: default_session_path() }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from(".ledgerlink-session.json")
}

/// Listing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { page_size: default_page_size() }
    }
}

fn default_page_size() -> usize {
    20
}

/// Autocomplete settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Shorter search texts never hit the API
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_chars: default_min_chars(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_min_chars() -> usize {
    1
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote endpoints
    #[serde(default)]
    pub api: ApiConfig,
    /// Login settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session storage
    #[serde(default)]
    pub session: SessionConfig,
    /// Listing settings
    #[serde(default)]
    pub listing: ListingConfig,
    /// Autocomplete settings
    #[serde(default)]
    pub autocomplete: AutocompleteConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_yaml(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from YAML text without validating it
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoints = [
            ("api.filter_endpoint", &self.api.filter_endpoint),
            ("api.export_endpoint", &self.api.export_endpoint),
            ("api.upload_endpoint", &self.api.upload_endpoint),
            ("api.category_autocomplete_endpoint", &self.api.category_autocomplete_endpoint),
            ("api.description_autocomplete_endpoint", &self.api.description_autocomplete_endpoint),
        ];
        for (field, value) in endpoints {
            validate_endpoint(field, value)?;
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.listing.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "listing.page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Whether login verification is possible with this configuration
    pub fn has_credentials(&self) -> bool {
        !self.auth.username.is_empty() && !self.auth.password_hash.is_empty()
    }
}

fn validate_endpoint(field: &str, value: &str) -> Result<(), ConfigError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(parsed) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("Unsupported scheme '{}'", parsed.scheme()),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("Not an absolute URL: {}", e),
        }),
    }
}
