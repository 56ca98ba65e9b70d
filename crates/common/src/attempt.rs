//! Verification attempt model

use serde::{Deserialize, Serialize};

use crate::Error;

/// Verification status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Waiting on the verification endpoint
    Pending,
    /// Token accepted
    Success,
    /// Token missing or rejected
    Error,
}

impl VerificationStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, VerificationStatus::Pending)
    }
}

/// One attempt at verifying an email address, created per page activation.
///
/// Status only ever moves `Pending -> Success` or `Pending -> Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationAttempt {
    /// Token read from the link, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Current status
    pub status: VerificationStatus,

    /// Message shown to the user once the attempt resolves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerificationAttempt {
    /// Create a new pending attempt
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            status: VerificationStatus::Pending,
            message: None,
        }
    }

    /// Mark attempt as succeeded. Returns `false` if it had already resolved.
    pub fn mark_success(&mut self, message: impl Into<String>) -> bool {
        self.resolve(VerificationStatus::Success, message.into())
    }

    /// Mark attempt as failed. Returns `false` if it had already resolved.
    pub fn mark_failed(&mut self, error: &Error) -> bool {
        self.resolve(VerificationStatus::Error, error.to_string())
    }

    fn resolve(&mut self, status: VerificationStatus, message: String) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        self.message = Some(message);
        true
    }
}
