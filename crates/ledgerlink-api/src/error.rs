//! Error types for ledgerlink-api

use ledgerlink_core::{CoreError, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Unreadable response body: {message}")]
    Decode { message: String },

    #[error("Invalid submission: {message}")]
    InvalidSubmission { message: String },

    #[error("Upload failed: {message}")]
    UploadFailed { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Network { .. }
            | ApiError::Status { .. }
            | ApiError::Decode { .. }
            | ApiError::UploadFailed { .. } => ErrorCode::NetworkError,
            ApiError::InvalidSubmission { .. } => ErrorCode::ValidationError,
            ApiError::Io { .. } => ErrorCode::StorageError,
            ApiError::Core(e) => e.code(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::Decode { message: error.to_string() }
        } else {
            ApiError::Network { message: error.to_string() }
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(error: std::io::Error) -> Self {
        ApiError::Io { message: error.to_string() }
    }
}

impl From<ApiError> for CoreError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Core(e) => e,
            ApiError::InvalidSubmission { message } => CoreError::ValidationError { message },
            ApiError::Io { message } => CoreError::StorageError { message },
            other => CoreError::NetworkError { message: other.to_string() },
        }
    }
}
