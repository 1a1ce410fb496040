//! Error types for the TVDB client.
//!
//! Every public operation returns [`TvdbError`]. The variants map onto the
//! failure kinds callers need to tell apart: missing configuration, bad
//! arguments, login failures, absent resources and any other API failure.

use thiserror::Error;

/// Why a login attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// The login endpoint answered with a non-2xx status.
    Rejected {
        /// HTTP status code of the login response.
        status: u16,
    },
    /// The login response carried no `token` string.
    MissingToken,
    /// Every login attempt hit the transport timeout.
    TimedOut {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { status } => {
                write!(f, "authentication failed with status code: {status}")
            }
            Self::MissingToken => write!(f, "failed to get token from login request"),
            Self::TimedOut { attempts } => {
                write!(f, "authentication timed out {attempts} times")
            }
        }
    }
}

/// Error type for TVDB operations.
#[derive(Error, Debug)]
pub enum TvdbError {
    /// A required secret could not be resolved, or the HTTP client could not be built.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An argument was rejected before any network activity.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Logging in to the API failed.
    #[error("{0}")]
    Authentication(AuthFailure),

    /// The requested resource does not exist (or the response had no data).
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Any other API failure. Carries the raw response text.
    #[error("API error (HTTP {status}): {body}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A JSON payload could not be converted into a model type.
    #[error("failed to decode response data: {0}")]
    Decode(#[from] serde_json::Error),

    /// A URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl TvdbError {
    /// Returns `true` for [`TvdbError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` for [`TvdbError::Authentication`].
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

/// Result type alias for TVDB operations.
pub type Result<T> = std::result::Result<T, TvdbError>;
