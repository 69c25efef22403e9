//! Error types for the S3 to Loggly pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, TranscodeError>;

/// Failure of one pipeline invocation.
///
/// Every stage maps its failures onto one of three kinds. The first error
/// aborts the invocation; nothing partial is forwarded.
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// No destination endpoint could be resolved
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bucket tagging, object retrieval or the forward call failed
    #[error("Dependency error: {0}")]
    Dependency(String),

    /// The object is not valid gzip, or a line does not match the column layout
    #[error("Format error: {0}")]
    Format(String),
}

/// Discriminant of [`TranscodeError`], handy for assertions and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Dependency,
    Format,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Dependency => write!(f, "dependency"),
            ErrorKind::Format => write!(f, "format"),
        }
    }
}

impl TranscodeError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a dependency error
    pub fn dependency(msg: impl Into<String>) -> Self {
        Self::Dependency(msg.into())
    }

    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscodeError::Configuration(_) => ErrorKind::Configuration,
            TranscodeError::Dependency(_) => ErrorKind::Dependency,
            TranscodeError::Format(_) => ErrorKind::Format,
        }
    }
}
