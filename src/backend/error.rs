//! Backend error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classifier error with classification for retry logic
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClassifyError {
    pub kind: ClassifyErrorKind,
    pub message: String,
}

#[allow(dead_code)] // The simulated classifier never fails
impl ClassifyError {
    pub fn new(kind: ClassifyErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ClassifyErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ClassifyErrorKind::Timeout, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ClassifyErrorKind::MalformedIntent, message)
    }

    pub fn low_confidence(message: impl Into<String>) -> Self {
        Self::new(ClassifyErrorKind::LowConfidence, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ClassifyErrorKind::Unavailable, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyErrorKind {
    /// Connection problems - retryable
    Network,
    /// Classifier did not answer in time - retryable
    Timeout,
    /// Classifier could not parse the request - not retryable
    MalformedIntent,
    /// Classifier answered but is unsure - not retryable
    LowConfidence,
    /// No classifier configured or it refused service
    Unavailable,
}

impl ClassifyErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Timeout)
    }
}

/// Submission error
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SubmitError {
    pub kind: SubmitErrorKind,
    pub message: String,
}

#[allow(dead_code)] // The simulated submitter never fails
impl SubmitError {
    pub fn new(kind: SubmitErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(SubmitErrorKind::Rejected, message)
    }

    pub fn insufficient_funds(message: impl Into<String>) -> Self {
        Self::new(SubmitErrorKind::InsufficientFunds, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SubmitErrorKind::Timeout, message)
    }
}

/// Submissions are never retried automatically; a timeout leaves the
/// on-chain outcome unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitErrorKind {
    Rejected,
    InsufficientFunds,
    Timeout,
}
