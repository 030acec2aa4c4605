//! Error handling module for KayClipper

use thiserror::Error;

/// Low-level error type for parsing, I/O and network operations
#[derive(Error, Debug)]
pub enum ClipperError {
    /// Invalid time format
    #[error("Invalid time format: {time}. Expected HH:MM:SS, MM:SS, or seconds")]
    InvalidTimeFormat { time: String },

    /// Release server answered with an error status
    #[error("Download failed: {message}")]
    DownloadError { message: String },

    /// Release archive did not contain what we need
    #[error("Archive error: {message}")]
    ArchiveError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Zip archive error
    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// TOML parse error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Background task failed to complete
    #[error("Background task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

/// Result type alias for KayClipper operations
pub type ClipperResult<T> = std::result::Result<T, ClipperError>;
