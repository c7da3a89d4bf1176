//! Error types for MiCam client operations

use thiserror::Error;

/// Result type alias for MiCam client operations
pub type Result<T> = std::result::Result<T, MiCamClientError>;

/// Failure of a single attempt against the device
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP request could not be completed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Device answered outside the 2xx range
    #[error("Device returned HTTP {0}")]
    Status(u16),

    /// Attempt exceeded the per-request timeout
    #[error("Request timed out")]
    Timeout,

    /// Any other transport-level failure
    #[error("{0}")]
    Other(String),
}

/// Errors that can occur during MiCam client operations
#[derive(Error, Debug)]
pub enum MiCamClientError {
    /// Every permitted attempt failed
    #[error("Device communication failed after {attempts} attempt(s){}", last_suffix(.last))]
    Communication {
        attempts: u32,
        last: Option<TransportError>,
    },

    /// A 2xx body without the status line
    #[error("Malformed device response: {0:?}")]
    MalformedResponse(String),

    /// Caller cancelled the operation
    #[error("Request cancelled")]
    Cancelled,

    /// Invalid base URI or request path
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn last_suffix(last: &Option<TransportError>) -> String {
    match last {
        Some(err) => format!(": {}", err),
        None => String::new(),
    }
}

/// Fieldless discriminant of [`MiCamClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Communication,
    MalformedResponse,
    Cancelled,
    InvalidUrl,
    Http,
    Io,
}

impl MiCamClientError {
    /// Create a communication error from the attempt count and the final failure
    pub fn communication(attempts: u32, last: Option<TransportError>) -> Self {
        Self::Communication { attempts, last }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Communication { .. } => ErrorKind::Communication,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::Http(_) => ErrorKind::Http,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// True when the caller cancelled the operation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
