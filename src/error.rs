//! Error types and handling.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No sync endpoint configured
    #[error("Sync endpoint is not configured")]
    NotConfigured,

    /// Username or password missing
    #[error("Username and password are required")]
    MissingCredentials,

    /// Endpoint rejected the credentials
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Data parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excel export error
    #[error("Export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    /// Offline cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Request failed and no cached entry was available
    #[error("Offline and no cached copy of {0}")]
    Offline(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a parse error with message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a cache error with message
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }
}
