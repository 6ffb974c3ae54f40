// ── Core error types ──
//
// Domain errors from routerlink-core. Consumers never see raw framing or
// socket failures: the `From<routerlink_api::Error>` impl translates
// transport-layer errors into domain variants, and every public operation
// folds these into a result value before returning.

use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// Coarse classification carried by operation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum ErrorKind {
    /// Router not configured, or no PPP secret for the account.
    NotFound,
    /// Unreachable host, refused login, or transport reset.
    ConnectionError,
    /// Deadline or read timeout elapsed.
    Timeout,
    /// The router refused or failed a state-changing command.
    WriteFailure,
    /// The primary change landed but session eviction was incomplete.
    PartialCleanupFailure,
    /// The router refused a read.
    Rejected,
    /// Registry entry present but unusable.
    Configuration,
    /// The operation task died.
    Internal,
}

impl ErrorKind {
    /// Safe to retry later without operator involvement.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::ConnectionError | Self::Timeout)
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Router '{name}' is not configured")]
    RouterNotFound { name: String },

    #[error("PPP Secret not found")]
    SecretNotFound { account: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to router '{router}': {reason}")]
    ConnectionFailed { router: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Router connection lost: {reason}")]
    Disconnected { reason: String },

    #[error("Router did not answer within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Failed to {action} PPP Secret: {message}")]
    WriteFailed {
        action: &'static str,
        message: String,
    },

    #[error("{failed} of {total} active sessions could not be evicted")]
    PartialCleanup { failed: usize, total: usize },

    #[error("Operation rejected by router: {message}")]
    Rejected { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RouterNotFound { .. } | Self::SecretNotFound { .. } => ErrorKind::NotFound,
            Self::ConnectionFailed { .. }
            | Self::AuthenticationFailed { .. }
            | Self::Disconnected { .. } => ErrorKind::ConnectionError,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::WriteFailed { .. } => ErrorKind::WriteFailure,
            Self::PartialCleanup { .. } => ErrorKind::PartialCleanupFailure,
            Self::Rejected { .. } => ErrorKind::Rejected,
            Self::Config { .. } => ErrorKind::Configuration,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<routerlink_api::Error> for CoreError {
    fn from(err: routerlink_api::Error) -> Self {
        use routerlink_api::Error as Api;

        match err {
            Api::Transport(e) => CoreError::Disconnected {
                reason: e.to_string(),
            },
            Api::Resolve { host } => CoreError::ConnectionFailed {
                router: host,
                reason: "host name did not resolve".into(),
            },
            Api::ConnectTimeout {
                address,
                timeout_secs,
            } => CoreError::ConnectionFailed {
                router: address,
                reason: format!("connect timed out after {timeout_secs}s"),
            },
            Api::ReadTimeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            Api::ConnectionClosed => CoreError::Disconnected {
                reason: "connection closed by router".into(),
            },
            Api::Authentication { message } => CoreError::AuthenticationFailed { message },
            Api::UnsupportedLogin => CoreError::AuthenticationFailed {
                message: "router requires the pre-6.43 challenge login".into(),
            },
            Api::Trap { message, .. } => CoreError::Rejected { message },
            Api::Fatal { message } => CoreError::Disconnected { reason: message },
            Api::Protocol(message) => CoreError::Internal(format!("protocol error: {message}")),
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("unexpected reply: {message}"))
            }
        }
    }
}
