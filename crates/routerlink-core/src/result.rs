// ── Operation results ──
//
// Every public operation returns one of these values instead of an error.
// Failures below the operation boundary are normalized here.

use serde::Serialize;

use crate::error::{CoreError, ErrorKind};
use crate::model::AccessRecord;

pub const NO_ACCOUNT: &str = "No username provided";
pub const OPERATION_TIMEOUT: &str = "Operation timeout";

/// Uniform `{success, message, error}` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(kind),
        }
    }

    pub fn from_error(err: &CoreError) -> Self {
        Self::failed(err.to_string(), err.kind())
    }

    /// Attach a classification without touching `success`.
    #[must_use]
    pub fn with_error(mut self, kind: ErrorKind) -> Self {
        self.error = Some(kind);
        self
    }
}

/// Outcome of a read-only status check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub success: bool,
    pub found: bool,
    /// `None` when no record was read.
    pub disabled: Option<bool>,
    pub profile: Option<String>,
    pub service: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl StatusReport {
    fn empty(success: bool, message: impl Into<String>, error: Option<ErrorKind>) -> Self {
        Self {
            success,
            found: false,
            disabled: None,
            profile: None,
            service: None,
            message: message.into(),
            error,
        }
    }

    pub fn no_account() -> Self {
        Self::empty(false, NO_ACCOUNT, None)
    }

    /// The router answered and holds no secret for the account.
    pub fn not_found() -> Self {
        Self::empty(true, "PPP Secret not found", None)
    }

    pub fn found(record: AccessRecord) -> Self {
        Self {
            success: true,
            found: true,
            disabled: Some(record.disabled),
            message: if record.disabled {
                "PPP Secret is disabled".into()
            } else {
                "PPP Secret is enabled".into()
            },
            profile: record.profile,
            service: record.service,
            error: None,
        }
    }

    pub fn from_error(err: &CoreError) -> Self {
        Self::empty(false, err.to_string(), Some(err.kind()))
    }
}

/// What the deadline guard hands back when the operation itself cannot.
pub trait GuardFallback {
    fn timed_out() -> Self;
    fn aborted(reason: &str) -> Self;
}

impl GuardFallback for OperationResult {
    fn timed_out() -> Self {
        Self::failed(OPERATION_TIMEOUT, ErrorKind::Timeout)
    }

    fn aborted(reason: &str) -> Self {
        Self::from_error(&CoreError::Internal(reason.to_owned()))
    }
}

impl GuardFallback for StatusReport {
    fn timed_out() -> Self {
        Self::empty(false, OPERATION_TIMEOUT, Some(ErrorKind::Timeout))
    }

    fn aborted(reason: &str) -> Self {
        Self::from_error(&CoreError::Internal(reason.to_owned()))
    }
}
