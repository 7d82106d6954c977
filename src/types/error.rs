//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides error classification so failed analyses can be described
//! per package instead of aborting a batch.
//!
//! ## Error Categories
//!
//! - **Auth**: Credentials rejected by the provider
//! - **RateLimit**: Provider throttled the request
//! - **Network**: Connectivity issues, timeouts
//! - **Unavailable**: Provider endpoint missing or down
//! - **BadRequest**: Request rejected as malformed
//! - **Transient**: Temporary server-side failure

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used to describe provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Authentication failed
    Auth,
    /// Rate limited
    RateLimit,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "AUTH"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Short human-readable hint for the category
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Auth => "the provider rejected the configured API key",
            Self::RateLimit => "the provider is rate limiting requests, try again later",
            Self::Network => "the provider could not be reached",
            Self::Unavailable => "the provider endpoint is unavailable",
            Self::BadRequest => "the provider rejected the request",
            Self::Transient => "the provider reported a temporary server error",
            Self::Unknown => "the provider returned an unexpected response",
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps HTTP status codes and error variants to categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify HTTP status code
    pub fn classify_http_status(status: u16) -> ErrorCategory {
        match status {
            401 | 403 => ErrorCategory::Auth,
            429 => ErrorCategory::RateLimit,
            400 | 413 | 422 => ErrorCategory::BadRequest,
            404 => ErrorCategory::Unavailable,
            500 | 502 | 503 | 504 | 529 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Classify an application error
    pub fn classify(err: &PkgError) -> ErrorCategory {
        match err {
            PkgError::Provider { status, .. } => Self::classify_http_status(*status),
            PkgError::Transport { .. } | PkgError::Timeout { .. } => ErrorCategory::Network,
            PkgError::Config(_) => ErrorCategory::BadRequest,
            _ => ErrorCategory::Unknown,
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum PkgError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    /// Non-success HTTP response from an AI provider
    #[error("{provider} API error ({status}): {body}")]
    Provider {
        provider: String,
        status: u16,
        body: String,
    },

    /// Network failure talking to an AI provider
    #[error("{provider} request failed: {cause}")]
    Transport { provider: String, cause: String },

    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Package manager error: {0}")]
    Invoker(String),

    #[error("Report persistence error for {path}: {message}")]
    Persistence { path: String, message: String },

    #[error("Package not found: {0}")]
    PackageNotFound(String),
}

pub type Result<T> = std::result::Result<T, PkgError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl PkgError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a provider HTTP error
    pub fn provider(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a provider transport error
    pub fn transport(provider: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Transport {
            provider: provider.into(),
            cause: cause.to_string(),
        }
    }

    /// Create a persistence error
    pub fn persistence(path: impl AsRef<std::path::Path>, message: impl std::fmt::Display) -> Self {
        Self::Persistence {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Error category for routing and descriptions
    pub fn category(&self) -> ErrorCategory {
        ErrorClassifier::classify(self)
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Attach the path of the report file being read or written
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| PkgError::persistence(path, e))
    }
}

// =============================================================================
// Tests
// =============================================================================
