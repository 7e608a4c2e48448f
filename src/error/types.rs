//! Core error types.

use std::time::Duration;
use thiserror::Error;

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, SunoError>;

/// Errors returned by the Suno client
#[derive(Error, Debug, Clone)]
pub enum SunoError {
    /// The API key was rejected (remote code 401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The service is throttling requests (remote code 405/430)
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        /// Hint taken from a `Retry-After` header when present
        retry_after: Option<Duration>,
    },

    /// The account has run out of credits (remote code 429)
    #[error("Insufficient credits: {0}")]
    InsufficientCredits(String),

    /// The request was rejected as malformed (remote code 400)
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Any other non-success response
    #[error("Remote service error ({code}): {message}")]
    RemoteService {
        code: i64,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Network-level failure (connect, timeout, truncated body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The task did not reach a terminal state within the allowed wait
    #[error("Task {task_id} timed out after {}s", .waited.as_secs())]
    Timeout { task_id: String, waited: Duration },

    /// The remote task finished in a failed state
    #[error("Task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    /// The wait was abandoned locally; the remote task is unaffected
    #[error("Waiting for task {task_id} was cancelled")]
    Cancelled { task_id: String },

    /// A response could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid or missing local configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Local file system failure
    #[error("IO error: {0}")]
    Io(String),
}

/// Error kind for presentation (coarse-grained)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    RateLimit,
    Credits,
    Client,
    Server,
    Network,
    Timeout,
    TaskFailed,
    Cancelled,
    Parsing,
    Configuration,
    Io,
}

impl SunoError {
    /// Create a remote service error without details
    pub fn remote(code: i64, message: impl Into<String>) -> Self {
        Self::RemoteService {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a remote service error carrying the raw response
    pub fn remote_with_details(
        code: i64,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::RemoteService {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create a rate limit error without a retry hint
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after: None,
        }
    }

    /// Presentation category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Auth,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::InsufficientCredits(_) => ErrorKind::Credits,
            Self::InvalidParameters(_) => ErrorKind::Client,
            Self::RemoteService { code, .. } if (500..=599).contains(code) => ErrorKind::Server,
            Self::RemoteService { .. } => ErrorKind::Client,
            Self::Transport(_) => ErrorKind::Network,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::TaskFailed { .. } => ErrorKind::TaskFailed,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Parse(_) => ErrorKind::Parsing,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::RateLimit { .. } => true,
            Self::RemoteService { code, .. } => (500..=599).contains(code),
            _ => false,
        }
    }

    /// Remote status code, when the error came from the service
    pub fn status_code(&self) -> Option<i64> {
        match self {
            Self::Authentication(_) => Some(401),
            Self::InvalidParameters(_) => Some(400),
            Self::InsufficientCredits(_) => Some(429),
            Self::RemoteService { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Message for the CLI/UI boundary, with a hint when one applies
    pub fn user_message(&self) -> String {
        match self.suggestion() {
            Some(hint) => format!("{self}\n{hint}"),
            None => self.to_string(),
        }
    }

    /// Short hint for CLI/UI rendering
    pub fn suggestion(&self) -> Option<&'static str> {
        match self.kind() {
            ErrorKind::Auth => Some("Check the API key in key.txt (or SUNO_API_KEY)."),
            ErrorKind::Credits => Some("Top up credits on the Suno API dashboard."),
            ErrorKind::RateLimit => Some("Wait a moment before submitting again."),
            ErrorKind::Timeout => Some("The task may still finish; check it later with `suno status`."),
            ErrorKind::Network => Some("Check your network connection or proxy settings."),
            _ => None,
        }
    }
}
