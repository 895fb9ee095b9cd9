//! Global error types for the Showcase application.
//!
//! All error categories across the application are unified into a single
//! `ScError` enum with conversions from underlying library errors. Callers
//! that only care whether a failure came from the data/object stores or
//! from authentication use [`ScError::kind`].

use thiserror::Error;

/// Convenience type alias for Results using ScError.
pub type ScResult<T> = Result<T, ScError>;

/// The two failure kinds surfaced to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Any failure of a data or object operation.
    Store,
    /// Failure to establish or use an authenticated session.
    Auth,
}

/// Unified error type covering all error categories in Showcase.
#[derive(Error, Debug)]
pub enum ScError {
    // -- Configuration errors --
    /// Failed to load or parse application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Network errors --
    /// HTTP request failed.
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request or service operation timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Backend returned an error response.
    #[error("server error (status {status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Error message from the backend.
        message: String,
    },

    /// The backend's access rules refused a data or object operation.
    #[error("access denied (status {status}): {message}")]
    Forbidden {
        /// HTTP status code.
        status: u16,
        /// Error message from the backend.
        message: String,
    },

    // -- Auth errors --
    /// Authentication failed or the session token was rejected.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The operation needs a signed-in session and none is active.
    #[error("not authenticated")]
    NotAuthenticated,

    // -- Store errors --
    /// A write matched no record.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input rejected before reaching the backend.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Object storage operation failed.
    #[error("storage error: {0}")]
    Storage(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScError {
    /// Classify this error as a store or auth failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScError::AuthFailed(_) | ScError::NotAuthenticated => ErrorKind::Auth,
            _ => ErrorKind::Store,
        }
    }

    /// Whether this is an auth-kind failure.
    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}

impl From<serde_json::Error> for ScError {
    fn from(e: serde_json::Error) -> Self {
        ScError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for ScError {
    fn from(e: toml::de::Error) -> Self {
        ScError::Config(e.to_string())
    }
}
