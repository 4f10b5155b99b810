//! flowbridge error types

use thiserror::Error;

/// flowbridge error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cookie store error
    #[error("Cookie error: {0}")]
    Cookie(String),

    /// Session error
    #[error("Session error: {0}")]
    Session(String),

    /// Chat backend error
    #[error("Backend error: {0}")]
    Backend(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for flowbridge operations
pub type Result<T> = std::result::Result<T, Error>;
