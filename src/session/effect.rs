//! Effects produced by state transitions

use crate::session::state::PendingTransaction;
use crate::store::Author;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastVariant {
    Default,
    Destructive,
}

/// Informational notification for connected clients. Never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the transcript
    AppendMessage { author: Author, content: String },

    /// Persist the new state
    PersistState,

    /// Run the intent classifier (spawns as background task)
    RequestClassification { text: String, attempt: u32 },

    /// Schedule a classification retry
    ScheduleRetry { delay: Duration, attempt: u32 },

    /// Submit the confirmed transaction (spawns as background task)
    SubmitTransaction { transaction: PendingTransaction },

    /// Deliver the simulated voice transcript after a delay
    ScheduleVoiceTranscript { delay: Duration },

    /// Complete the simulated wallet handshake after a delay
    ScheduleWalletHandshake { delay: Duration, handshake: u32 },

    /// Push a notification to connected clients
    Notify(Toast),
}

impl Effect {
    pub fn user_message(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            author: Author::User,
            content: content.into(),
        }
    }

    pub fn assistant_message(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            author: Author::Assistant,
            content: content.into(),
        }
    }

    pub fn toast(title: impl Into<String>, description: impl Into<String>) -> Self {
        Effect::Notify(Toast {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        })
    }

    pub fn error_toast(title: impl Into<String>, description: impl Into<String>) -> Self {
        Effect::Notify(Toast {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        })
    }

    /// Author of an appended message, if this effect appends one
    #[allow(dead_code)] // Used by tests
    pub fn appended_author(&self) -> Option<Author> {
        match self {
            Effect::AppendMessage { author, .. } => Some(*author),
            _ => None,
        }
    }
}
