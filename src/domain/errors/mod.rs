// Domain errors - Error taxonomy for the clip pipeline

use std::fmt;

use crate::error::ClipperError;

/// Rejections raised before any subprocess is started
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No source URL was given
    MissingUrl,
    /// No output path was given
    MissingOutputPath,
    /// Start field could not be parsed
    InvalidStartTime(String),
    /// End field could not be parsed
    InvalidEndTime(String),
    /// Both bounds set but start is not before end
    StartNotBeforeEnd { start: f64, end: f64 },
    /// Output format is not one of the supported containers
    UnknownContainer(String),
    /// Quality label is not one of the supported presets
    UnknownQuality(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingUrl => write!(f, "Please provide a video URL"),
            ValidationError::MissingOutputPath => write!(f, "Please provide an output file"),
            ValidationError::InvalidStartTime(text) => {
                write!(f, "Invalid start time format: '{}'", text)
            }
            ValidationError::InvalidEndTime(text) => {
                write!(f, "Invalid end time format: '{}'", text)
            }
            ValidationError::StartNotBeforeEnd { start, end } => write!(
                f,
                "Start time ({}s) must be less than end time ({}s)",
                start, end
            ),
            ValidationError::UnknownContainer(name) => write!(
                f,
                "Unsupported format: '{}'. Supported: mp4, webm, mkv, mp3, wav, aac",
                name
            ),
            ValidationError::UnknownQuality(name) => write!(
                f,
                "Unsupported quality: '{}'. Supported: Best, 1080p, 720p, 480p, 360p",
                name
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Domain-specific error types
#[derive(Debug, Clone)]
pub enum DomainError {
    /// Bad or missing user input
    Validation(ValidationError),
    /// Required tool absent and the user declined or the fetch failed
    DependencyMissing(String),
    /// GPU probing failed; callers degrade to software encoding
    ProbeFailure(String),
    /// The clip operation failed
    ExecutionFailure(String),
    /// A dependency download failed
    NetworkFailure(String),
    /// Configuration could not be loaded or is invalid
    ConfigError(String),
    /// Another action of the same kind is still running
    Busy(String),
    /// Internal error
    InternalError(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Validation(err) => write!(f, "Validation failed: {}", err),
            DomainError::DependencyMissing(msg) => write!(f, "Dependency missing: {}", msg),
            DomainError::ProbeFailure(msg) => write!(f, "GPU probe failed: {}", msg),
            DomainError::ExecutionFailure(msg) => write!(f, "Clipping failed: {}", msg),
            DomainError::NetworkFailure(msg) => write!(f, "Network failure: {}", msg),
            DomainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DomainError::Busy(msg) => write!(f, "Busy: {}", msg),
            DomainError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::Validation(err)
    }
}

impl From<ClipperError> for DomainError {
    fn from(err: ClipperError) -> Self {
        match err {
            ClipperError::DownloadError { .. } | ClipperError::HttpError(_) => {
                DomainError::NetworkFailure(err.to_string())
            }
            ClipperError::ArchiveError { .. } | ClipperError::ZipError(_) => {
                DomainError::DependencyMissing(err.to_string())
            }
            ClipperError::TomlError(_) => {
                DomainError::ConfigError(err.to_string())
            }
            other => DomainError::InternalError(other.to_string()),
        }
    }
}
