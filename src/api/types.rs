//! API request and response types

use crate::session::state::{PendingTransaction, WalletStatus};
use crate::session::ChatState;
use crate::store::{Message, SessionSummary};
use serde::{Deserialize, Serialize};

/// Prompts offered before the user has said anything
pub const SUGGESTIONS: [&str; 4] = [
    "Swap 100 USDC for ETH on Uniswap",
    "Mint an NFT from contract 0x123...",
    "Delegate 50 tokens to validator abc123",
    "Check my token balance for USDC",
];

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Response for user actions
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub queued: bool,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Read-only view of one session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub messages: Vec<Message>,
    pub pending: Option<PendingTransaction>,
    pub is_classifying: bool,
    pub is_submitting: bool,
    pub activity: &'static str,
    pub voice_capturing: bool,
    pub draft: String,
    pub wallet: WalletStatus,
    pub suggestions: Vec<&'static str>,
}

impl SessionView {
    pub fn new(id: impl Into<String>, messages: Vec<Message>, state: &ChatState) -> Self {
        // Only the greeting so far
        let suggestions = if messages.len() <= 1 && !state.is_classifying() {
            SUGGESTIONS.to_vec()
        } else {
            Vec::new()
        };

        Self {
            id: id.into(),
            messages,
            pending: state.pending.clone(),
            is_classifying: state.is_classifying(),
            is_submitting: state.is_submitting(),
            activity: state.activity_name(),
            voice_capturing: state.voice_capturing,
            draft: state.draft.clone(),
            wallet: state.wallet.clone(),
            suggestions,
        }
    }
}

/// Response with a list of sessions
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
