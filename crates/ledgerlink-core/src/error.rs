//! Error types for ledgerlink-core
//!
//! Only a few failures ever reach the user (login, network, validation,
//! storage, config). The rest are absorbed where they occur: a missing session
//! sends the request unsigned, a bad field falls back to its default, and an
//! odd envelope is read as a single record. [`CoreError::is_user_visible`]
//! draws that line.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AuthRequired,
    LoginRejected,
    NetworkError,
    BadResponseShape,
    InvalidDate,
    InvalidDocument,
    ValidationError,
    StorageError,
    ConfigError,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthRequired => "AUTH_REQUIRED",
            ErrorCode::LoginRejected => "LOGIN_REJECTED",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::BadResponseShape => "BAD_RESPONSE_SHAPE",
            ErrorCode::InvalidDate => "INVALID_DATE",
            ErrorCode::InvalidDocument => "INVALID_DOCUMENT",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How loudly an error is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Recovered in place, e.g. a field default
    Recovered,
    Warning,
    Error,
}

impl ErrorSeverity {
    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Recovered => log::Level::Debug,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
        }
    }
}

/// Structured report of a [`CoreError`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub severity: ErrorSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl ErrorDetails {
    fn cause(mut self, cause: &str) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    fn hint(mut self, hint: &str) -> Self {
        self.hints.push(hint.to_string());
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}, {:?}]", self.message, self.code, self.severity)?;
        for hint in &self.hints {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Not logged in, no credential to sign with")]
    AuthRequired,

    #[error("Login rejected")]
    LoginRejected,

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Unrecognized response shape: {message}")]
    BadResponseShape { message: String },

    #[error("Invalid date: {value}")]
    InvalidDate { value: String },

    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    #[error("{message}")]
    ValidationError { message: String },

    #[error("Session storage error: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::AuthRequired => ErrorCode::AuthRequired,
            CoreError::LoginRejected => ErrorCode::LoginRejected,
            CoreError::NetworkError { .. } => ErrorCode::NetworkError,
            CoreError::BadResponseShape { .. } => ErrorCode::BadResponseShape,
            CoreError::InvalidDate { .. } => ErrorCode::InvalidDate,
            CoreError::InvalidDocument { .. } => ErrorCode::InvalidDocument,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::StorageError { .. } => ErrorCode::StorageError,
            CoreError::ConfigError { .. } => ErrorCode::ConfigError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::AuthRequired
            | CoreError::InvalidDate { .. }
            | CoreError::InvalidDocument { .. } => ErrorSeverity::Recovered,
            CoreError::LoginRejected
            | CoreError::BadResponseShape { .. }
            | CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::NetworkError { .. }
            | CoreError::StorageError { .. }
            | CoreError::ConfigError { .. }
            | CoreError::InternalError { .. } => ErrorSeverity::Error,
        }
    }

    /// Whether the error is shown to the user rather than absorbed and logged
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            CoreError::LoginRejected
                | CoreError::NetworkError { .. }
                | CoreError::ValidationError { .. }
                | CoreError::StorageError { .. }
                | CoreError::ConfigError { .. }
        )
    }

    /// Text shown to the user; transport details stay in the log
    pub fn user_message(&self) -> String {
        match self {
            CoreError::LoginRejected => "Invalid username or password.".to_string(),
            CoreError::NetworkError { .. } => {
                "Something went wrong talking to the server. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails {
            code: self.code(),
            severity: self.severity(),
            message: self.to_string(),
            cause: None,
            hints: vec![],
        };

        match self {
            CoreError::AuthRequired => details.hint("run `ledgerlink login` to sign requests"),
            CoreError::NetworkError { message } => details.cause(message).hint("check the api endpoints in the config"),
            CoreError::BadResponseShape { message } => details.cause(message),
            CoreError::ValidationError { .. } => {
                details.hint("date, amount, category and description are required")
            }
            CoreError::StorageError { message } => details.cause(message).hint("check that session.path is writable"),
            CoreError::ConfigError { .. } => details.hint("run `ledgerlink init-config` for a template"),
            _ => details,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(error: io::Error) -> Self {
        CoreError::StorageError { message: error.to_string() }
    }
}

impl From<ledgerlink_config::ConfigError> for CoreError {
    fn from(error: ledgerlink_config::ConfigError) -> Self {
        CoreError::ConfigError { message: error.to_string() }
    }
}

/// Where an error happened
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub operation: String,
    pub data: Value,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            data: Value::Object(Default::default()),
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Sink for errors that are handled rather than propagated
pub trait ErrorLogger: Send + Sync {
    fn report(&self, error: &CoreError, context: &ErrorContext);
}

/// Writes reports through `log` at the error's severity
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn report(&self, error: &CoreError, context: &ErrorContext) {
        log::log!(
            target: "ledgerlink::error",
            error.severity().log_level(),
            "{} failed [{}]: {} {}",
            context.operation,
            error.code(),
            error,
            context.data
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_strings_match_serde() {
        for code in [ErrorCode::AuthRequired, ErrorCode::BadResponseShape, ErrorCode::NetworkError] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code));
        }
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(CoreError::AuthRequired.severity(), ErrorSeverity::Recovered);
        assert_eq!(CoreError::NetworkError { message: "timeout".into() }.severity(), ErrorSeverity::Error);
        assert_eq!(ErrorSeverity::Recovered.log_level(), log::Level::Debug);
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
    }

    #[test]
    fn test_user_visibility() {
        assert!(!CoreError::AuthRequired.is_user_visible());
        assert!(!CoreError::BadResponseShape { message: "x".into() }.is_user_visible());
        assert!(!CoreError::InvalidDate { value: "x".into() }.is_user_visible());
        assert!(!CoreError::InvalidDocument { message: "x".into() }.is_user_visible());
        assert!(CoreError::LoginRejected.is_user_visible());
        assert!(CoreError::NetworkError { message: "x".into() }.is_user_visible());
    }

    #[test]
    fn test_network_message_hides_transport_detail() {
        let error = CoreError::NetworkError { message: "connection reset by peer".to_string() };
        assert!(!error.user_message().contains("reset"));
        assert_eq!(error.to_details().cause.as_deref(), Some("connection reset by peer"));
    }

    #[test]
    fn test_validation_message_shown_verbatim() {
        let error = CoreError::ValidationError { message: "Password must not be empty".into() };
        assert_eq!(error.user_message(), "Password must not be empty");
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("listing.fetch_page").with("page", serde_json::json!(2));
        assert_eq!(context.operation, "listing.fetch_page");
        assert_eq!(context.data["page"], 2);
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let error: CoreError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(error.code(), ErrorCode::StorageError);
    }
}
