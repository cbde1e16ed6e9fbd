//! Error types for ledgerlink-config

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigErrorCode {
    FileNotFound,
    InvalidYaml,
    InvalidValue,
    Unreadable,
}

impl ConfigErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ConfigErrorCode::InvalidYaml => "INVALID_YAML",
            ConfigErrorCode::InvalidValue => "INVALID_VALUE",
            ConfigErrorCode::Unreadable => "UNREADABLE",
        }
    }
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong with the configuration and how to fix it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigErrorDetails {
    pub code: ConfigErrorCode,
    pub message: String,
    /// Dotted path of the offending key, e.g. `listing.page_size`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl ConfigErrorDetails {
    fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

impl std::fmt::Display for ConfigErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code)?;
        for hint in &self.hints {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file {path} does not exist")]
    FileNotFound { path: String },

    #[error("Configuration is not valid YAML: {message}")]
    InvalidYaml { message: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cannot read {path}: {message}")]
    Unreadable { path: String, message: String },
}

impl ConfigError {
    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::InvalidYaml { .. } => ConfigErrorCode::InvalidYaml,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
            ConfigError::Unreadable { .. } => ConfigErrorCode::Unreadable,
        }
    }

    pub fn to_details(&self) -> ConfigErrorDetails {
        let details = ConfigErrorDetails {
            code: self.code(),
            message: self.to_string(),
            field: None,
            hints: vec![],
        };

        match self {
            ConfigError::FileNotFound { .. } => details
                .hint("pass --config <path> to use another file")
                .hint("run `ledgerlink init-config` to write the default template"),
            ConfigError::InvalidValue { field, .. } if field.starts_with("api.") => ConfigErrorDetails {
                field: Some(field.clone()),
                ..details
            }
            .hint("endpoints must be absolute http:// or https:// URLs"),
            ConfigError::InvalidValue { field, .. } => ConfigErrorDetails {
                field: Some(field.clone()),
                ..details
            },
            ConfigError::InvalidYaml { .. } => details.hint("compare with the output of `ledgerlink init-config`"),
            ConfigError::Unreadable { .. } => details,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
