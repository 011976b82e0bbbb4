//! Error types for the sales call review client

use thiserror::Error;

/// Main error type for the sales call review client
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connection refused, DNS, TLS, ...)
    #[error("Network error: {message}")]
    Network {
        /// Error message
        message: String,
    },

    /// The backend rejected the bearer token (HTTP 401)
    #[error("Authentication required")]
    Unauthorized,

    /// Login was rejected for the supplied username and password
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// The authenticated user may not access the resource (HTTP 403)
    #[error("Access denied: {message}")]
    Forbidden {
        /// Error message from the backend
        message: String,
    },

    /// Resource not found (HTTP 404)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Resource that was not found
        resource: String,
    },

    /// Any other non-success response
    #[error("API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the backend
        message: String,
    },

    /// The owning view was torn down before the request resolved
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Validation error
    #[error("Validation error: {field} - {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new network error
    #[must_use]
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new validation error
    #[must_use]
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from the backend refusing the session
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::InvalidCredentials)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}
