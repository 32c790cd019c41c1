//! Chat session state types

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Pending Transaction
// ============================================================================

/// One named parameter of a transaction preview, formatted for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxParameter {
    pub name: String,
    pub value: String,
}

impl TxParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A proposed, not-yet-submitted contract call awaiting user confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub function_name: String,
    pub contract_address: String,
    /// Ordered as the template lists them
    pub parameters: Vec<TxParameter>,
    pub estimated_gas: String,
}

// ============================================================================
// Wallet
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WalletStatus {
    #[default]
    Disconnected,
    /// Handshake `handshake` is running
    Connecting {
        handshake: u32,
    },
    Connected {
        address: String,
    },
}

// ============================================================================
// Chat State
// ============================================================================

/// What async work, if any, the session is waiting on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activity {
    /// Ready for user input
    #[default]
    Idle,

    /// Classification request in flight, with retry tracking
    Classifying { text: String, attempt: u32 },

    /// Confirmed transaction is being submitted. The pending slot is occupied.
    Submitting,

    /// User rejected while the submission was in flight; waiting for it to settle
    CancellingSubmission,
}

/// Full state of one chat session, minus the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChatState {
    pub activity: Activity,
    pub pending: Option<PendingTransaction>,
    pub voice_capturing: bool,
    /// Input text staged for the user (filled by voice capture)
    pub draft: String,
    pub wallet: WalletStatus,
    /// Wallet handshakes started so far; numbers the next one
    #[serde(skip)]
    pub wallet_handshakes: u32,
}

impl ChatState {
    pub fn is_classifying(&self) -> bool {
        matches!(self.activity, Activity::Classifying { .. })
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.activity, Activity::Submitting)
    }

    /// True while any classification or submission is outstanding
    #[allow(dead_code)] // Used by tests
    pub fn is_busy(&self) -> bool {
        !matches!(self.activity, Activity::Idle)
    }

    pub fn activity_name(&self) -> &'static str {
        match self.activity {
            Activity::Idle => "idle",
            Activity::Classifying { .. } => "classifying",
            Activity::Submitting => "submitting",
            Activity::CancellingSubmission => "cancelling_submission",
        }
    }
}

// ============================================================================
// Session Context
// ============================================================================

/// Immutable per-session configuration
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    /// Delay before simulated voice capture yields its transcript
    pub voice_delay: Duration,
    /// Delay of the simulated wallet handshake
    pub wallet_delay: Duration,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            voice_delay: Duration::from_secs(2),
            wallet_delay: Duration::from_millis(1500),
        }
    }

    pub fn with_delays(mut self, voice_delay: Duration, wallet_delay: Duration) -> Self {
        self.voice_delay = voice_delay;
        self.wallet_delay = wallet_delay;
        self
    }
}
