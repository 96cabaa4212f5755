use thiserror::Error;

/// Main error type for the bet scenario client
#[derive(Error, Debug)]
pub enum HedgeError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Service unavailable: {message}")]
    Unavailable { status: u16, message: String },

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid service response: {0}")]
    InvalidResponse(String),

    // Validation errors (resolved locally, never reach the network)
    #[error("Validation failed: {0}")]
    Validation(String),

    // Service rejected well-formed input
    #[error("{message}")]
    Domain {
        message: String,
        suggestions: Vec<String>,
    },

    // Optimistic mutation rejected remotely and rolled back
    #[error("Bet {bet_id} could not be updated, change reverted: {reason}")]
    Consistency { bet_id: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    // Authentication errors
    #[error("Sign in required")]
    Unauthenticated,

    // State machine errors
    #[error("Invalid state transition: from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for HedgeError
pub type Result<T> = std::result::Result<T, HedgeError>;

/// User-facing error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required input missing or malformed; blocked before any request
    Validation,
    /// Transport or connectivity failure; safe to retry
    Network,
    /// Service rejected the input semantically
    Domain,
    /// Optimistic change was reverted
    Consistency,
}

impl HedgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HedgeError::Validation(_) | HedgeError::Unauthenticated => ErrorKind::Validation,
            HedgeError::Domain { .. } => ErrorKind::Domain,
            HedgeError::Consistency { .. } => ErrorKind::Consistency,
            HedgeError::NotFound(_) => ErrorKind::Domain,
            _ => ErrorKind::Network,
        }
    }

    /// Whether the retry loop may attempt the request again
    pub fn is_retryable(&self) -> bool {
        match self {
            HedgeError::Network(_) | HedgeError::Timeout { .. } => true,
            HedgeError::Unavailable { .. } => true,
            HedgeError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// The service is known not to have acted on the request: the connection
    /// was never established, or it answered 429/503 without a body.
    pub fn is_unprocessed(&self) -> bool {
        match self {
            HedgeError::Unavailable { status, .. } => matches!(status, 429 | 503),
            HedgeError::Http(e) => e.is_connect(),
            _ => false,
        }
    }

    /// Suggestions attached to a domain rejection, if any
    pub fn suggestions(&self) -> &[String] {
        match self {
            HedgeError::Domain { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}
