//! Events that can occur in a chat session

use crate::backend::{ClassifyErrorKind, SubmitErrorKind};
use crate::intent::IntentKind;
use crate::session::state::PendingTransaction;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserMessage {
        text: String,
    },
    ConfirmPending,
    RejectPending,
    ToggleVoiceCapture,
    ConnectWallet,
    DisconnectWallet,

    // Classifier events
    ClassificationComplete {
        intent: IntentKind,
        reply: String,
        transaction: Option<PendingTransaction>,
    },
    ClassificationFailed {
        message: String,
        error_kind: ClassifyErrorKind,
        attempt: u32,
    },
    RetryTimeout {
        attempt: u32,
    },

    // Submitter events
    SubmissionComplete {
        tx_hash: String,
    },
    SubmissionFailed {
        message: String,
        error_kind: SubmitErrorKind,
    },

    // Timer events
    VoiceTranscript {
        text: String,
    },
    WalletConnected {
        address: String,
        handshake: u32,
    },
}

impl Event {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Event::UserMessage { .. } => "user_message",
            Event::ConfirmPending => "confirm_pending",
            Event::RejectPending => "reject_pending",
            Event::ToggleVoiceCapture => "toggle_voice_capture",
            Event::ConnectWallet => "connect_wallet",
            Event::DisconnectWallet => "disconnect_wallet",
            Event::ClassificationComplete { .. } => "classification_complete",
            Event::ClassificationFailed { .. } => "classification_failed",
            Event::RetryTimeout { .. } => "retry_timeout",
            Event::SubmissionComplete { .. } => "submission_complete",
            Event::SubmissionFailed { .. } => "submission_failed",
            Event::VoiceTranscript { .. } => "voice_transcript",
            Event::WalletConnected { .. } => "wallet_connected",
        }
    }
}
