//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same new
//! state and effects. All I/O happens in the runtime that executes the effects.

use super::state::{Activity, ChatState, SessionContext, WalletStatus};
use super::{Effect, Event};
use crate::backend::{ClassifyErrorKind, SubmitErrorKind};
use std::time::Duration;
use thiserror::Error;

pub const MAX_CLASSIFY_ATTEMPTS: u32 = 3;

/// Canned phrase produced by simulated voice capture
pub const VOICE_TRANSCRIPT: &str = "Swap 100 USDC for ETH on Uniswap";

pub const CANCELLED_REPLY: &str =
    "Transaction cancelled. Is there anything else I can help you with?";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons an event is not applied. All of them leave the state untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Assistant is busy, try again when the current request finishes")]
    Busy,
    #[error("No transaction is awaiting confirmation")]
    NoPendingTransaction,
    #[error("Transaction submission already in progress")]
    SubmissionInProgress,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
#[allow(clippy::too_many_lines)] // One arm per (activity, event) pair reads best flat
pub fn transition(
    state: &ChatState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (&state.activity, event) {
        // ============================================================
        // User Text
        // ============================================================
        (_, Event::UserMessage { text }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        (Activity::Idle, Event::UserMessage { text }) => {
            let text = text.trim().to_string();
            let new_state = ChatState {
                activity: Activity::Classifying {
                    text: text.clone(),
                    attempt: 1,
                },
                draft: String::new(),
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::user_message(text.clone()))
                .with_effect(Effect::PersistState)
                .with_effect(Effect::RequestClassification { text, attempt: 1 }))
        }

        (_, Event::UserMessage { .. }) => Err(TransitionError::Busy),

        // ============================================================
        // Classification
        // ============================================================
        (
            Activity::Classifying { .. },
            Event::ClassificationComplete {
                reply, transaction, ..
            },
        ) => {
            let new_state = ChatState {
                activity: Activity::Idle,
                // A non-transactional reply leaves an existing preview in place
                pending: transaction.or_else(|| state.pending.clone()),
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::assistant_message(reply))
                .with_effect(Effect::PersistState))
        }

        (
            Activity::Classifying { text, attempt },
            Event::ClassificationFailed {
                error_kind,
                attempt: failed_attempt,
                ..
            },
        ) if *attempt == failed_attempt
            && error_kind.is_retryable()
            && *attempt < MAX_CLASSIFY_ATTEMPTS =>
        {
            let next = attempt + 1;
            let new_state = ChatState {
                activity: Activity::Classifying {
                    text: text.clone(),
                    attempt: next,
                },
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::PersistState)
                .with_effect(Effect::ScheduleRetry {
                    delay: retry_delay(next),
                    attempt: next,
                }))
        }

        (
            Activity::Classifying { attempt, .. },
            Event::ClassificationFailed {
                message,
                error_kind,
                attempt: failed_attempt,
            },
        ) if *attempt == failed_attempt => {
            let new_state = ChatState {
                activity: Activity::Idle,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::assistant_message(classification_failed_reply(
                    error_kind, &message,
                )))
                .with_effect(Effect::PersistState)
                .with_effect(Effect::error_toast("Request failed", message)))
        }

        (Activity::Classifying { text, attempt }, Event::RetryTimeout { attempt: retry })
            if *attempt == retry =>
        {
            Ok(TransitionResult::new(state.clone()).with_effect(
                Effect::RequestClassification {
                    text: text.clone(),
                    attempt: *attempt,
                },
            ))
        }

        // ============================================================
        // Confirmation
        // ============================================================
        (_, Event::ConfirmPending) if state.pending.is_none() => {
            Err(TransitionError::NoPendingTransaction)
        }

        (Activity::Idle, Event::ConfirmPending) => {
            let Some(transaction) = state.pending.clone() else {
                return Err(TransitionError::NoPendingTransaction);
            };
            let new_state = ChatState {
                activity: Activity::Submitting,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::PersistState)
                .with_effect(Effect::SubmitTransaction { transaction }))
        }

        (Activity::Submitting | Activity::CancellingSubmission, Event::ConfirmPending) => {
            Err(TransitionError::SubmissionInProgress)
        }

        (Activity::Classifying { .. }, Event::ConfirmPending) => Err(TransitionError::Busy),

        // ============================================================
        // Submission Outcome
        // ============================================================
        (Activity::Submitting, Event::SubmissionComplete { tx_hash }) => {
            let new_state = ChatState {
                activity: Activity::Idle,
                pending: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::assistant_message(format!(
                    "✅ Transaction sent successfully!\n\nTransaction Hash: {tx_hash}\n\nYou can track its progress on the BlockDAG explorer. The transaction should confirm in 1-2 minutes."
                )))
                .with_effect(Effect::PersistState)
                .with_effect(Effect::toast(
                    "Transaction Sent",
                    format!("TX: {}", abbreviate_hash(&tx_hash)),
                )))
        }

        (Activity::Submitting, Event::SubmissionFailed { message, error_kind }) => {
            let new_state = ChatState {
                activity: Activity::Idle,
                pending: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::assistant_message(submission_failed_reply(
                    error_kind, &message,
                )))
                .with_effect(Effect::PersistState)
                .with_effect(Effect::error_toast(
                    submission_failed_title(error_kind),
                    message,
                )))
        }

        (Activity::CancellingSubmission, Event::SubmissionComplete { tx_hash }) => {
            let new_state = ChatState {
                activity: Activity::Idle,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::assistant_message(format!(
                    "Your cancellation arrived after the transaction had already been broadcast.\n\nTransaction Hash: {tx_hash}\n\nCheck the BlockDAG explorer for its final status."
                )))
                .with_effect(Effect::PersistState)
                .with_effect(Effect::toast(
                    "Transaction Sent",
                    format!("TX: {}", abbreviate_hash(&tx_hash)),
                )))
        }

        (
            Activity::CancellingSubmission,
            Event::SubmissionFailed {
                message,
                error_kind: SubmitErrorKind::Timeout,
            },
        ) => {
            let new_state = ChatState {
                activity: Activity::Idle,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::assistant_message(submission_failed_reply(
                    SubmitErrorKind::Timeout,
                    &message,
                )))
                .with_effect(Effect::PersistState))
        }

        // Rejected after the user already cancelled: nothing reached the chain
        (Activity::CancellingSubmission, Event::SubmissionFailed { .. }) => {
            let new_state = ChatState {
                activity: Activity::Idle,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::PersistState))
        }

        // ============================================================
        // Rejection
        // ============================================================
        (_, Event::RejectPending) if state.pending.is_none() => {
            Err(TransitionError::NoPendingTransaction)
        }

        (activity, Event::RejectPending) => {
            let activity = match activity {
                // In-flight submissions run to completion
                Activity::Submitting => Activity::CancellingSubmission,
                other => other.clone(),
            };
            let new_state = ChatState {
                activity,
                pending: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::assistant_message(CANCELLED_REPLY))
                .with_effect(Effect::PersistState))
        }

        // ============================================================
        // Voice Capture
        // ============================================================
        (_, Event::ToggleVoiceCapture) => {
            let capturing = !state.voice_capturing;
            let result = TransitionResult::new(ChatState {
                voice_capturing: capturing,
                ..state.clone()
            })
            .with_effect(Effect::PersistState);
            if capturing {
                Ok(result.with_effect(Effect::ScheduleVoiceTranscript {
                    delay: context.voice_delay,
                }))
            } else {
                Ok(result)
            }
        }

        (_, Event::VoiceTranscript { text }) => Ok(TransitionResult::new(ChatState {
            voice_capturing: false,
            draft: text,
            ..state.clone()
        })
        .with_effect(Effect::PersistState)),

        // ============================================================
        // Wallet
        // ============================================================
        (_, Event::ConnectWallet) => match state.wallet {
            WalletStatus::Disconnected => {
                let handshake = state.wallet_handshakes.wrapping_add(1);
                Ok(TransitionResult::new(ChatState {
                    wallet: WalletStatus::Connecting { handshake },
                    wallet_handshakes: handshake,
                    ..state.clone()
                })
                .with_effects([
                    Effect::PersistState,
                    Effect::ScheduleWalletHandshake {
                        delay: context.wallet_delay,
                        handshake,
                    },
                ]))
            }
            _ => Err(TransitionError::InvalidTransition(
                "Wallet is already connected or connecting".to_string(),
            )),
        },

        (_, Event::WalletConnected { address, handshake }) => match state.wallet {
            WalletStatus::Connecting { handshake: current } if current == handshake => {
                let description = format!("Connected to {}", abbreviate_address(&address));
                Ok(TransitionResult::new(ChatState {
                    wallet: WalletStatus::Connected { address },
                    ..state.clone()
                })
                .with_effects([
                    Effect::PersistState,
                    Effect::toast("Wallet Connected", description),
                ]))
            }
            // Disconnected (or reconnected) while the handshake was running
            _ => Err(TransitionError::InvalidTransition(
                format!("Wallet handshake {handshake} is no longer current"),
            )),
        },

        (_, Event::DisconnectWallet) => match state.wallet {
            WalletStatus::Disconnected => Err(TransitionError::InvalidTransition(
                "Wallet is not connected".to_string(),
            )),
            _ => Ok(TransitionResult::new(ChatState {
                wallet: WalletStatus::Disconnected,
                ..state.clone()
            })
            .with_effects([
                Effect::PersistState,
                Effect::toast(
                    "Wallet Disconnected",
                    "Your wallet has been disconnected.",
                ),
            ])),
        },

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (activity, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {activity:?} with event {}",
            event.name()
        ))),
    }
}

// Helper functions

fn retry_delay(attempt: u32) -> Duration {
    // Exponential backoff: 1s, 2s, 4s
    Duration::from_secs(1 << (attempt.saturating_sub(2)).min(6))
}

fn classification_failed_reply(kind: ClassifyErrorKind, message: &str) -> String {
    match kind {
        ClassifyErrorKind::MalformedIntent => {
            "I couldn't make sense of that request. Could you rephrase it?".to_string()
        }
        ClassifyErrorKind::LowConfidence => {
            "I'm not confident I understood that correctly. Could you describe the transaction you want in more detail?".to_string()
        }
        ClassifyErrorKind::Network
        | ClassifyErrorKind::Timeout
        | ClassifyErrorKind::Unavailable => format!(
            "I couldn't process your request right now ({message}). Please try sending it again."
        ),
    }
}

fn submission_failed_reply(kind: SubmitErrorKind, message: &str) -> String {
    match kind {
        SubmitErrorKind::Rejected => format!(
            "❌ The network rejected the transaction: {message}\n\nNothing was sent. Ask me again if you'd like to retry."
        ),
        SubmitErrorKind::InsufficientFunds => format!(
            "❌ Your balance can't cover this transaction: {message}\n\nNothing was sent. Top up your wallet and ask me again."
        ),
        SubmitErrorKind::Timeout => format!(
            "⚠️ The transaction status is unknown: {message}\n\nIt may still confirm. Please check the BlockDAG explorer before trying again."
        ),
    }
}

fn submission_failed_title(kind: SubmitErrorKind) -> &'static str {
    match kind {
        SubmitErrorKind::Rejected => "Transaction Rejected",
        SubmitErrorKind::InsufficientFunds => "Insufficient Balance",
        SubmitErrorKind::Timeout => "Transaction Status Unknown",
    }
}

/// `0x123456...89abcdef` form of a transaction hash
pub fn abbreviate_hash(hash: &str) -> String {
    abbreviate(hash, 8, 8)
}

/// `0x742d...8B1` form of a wallet address
pub fn abbreviate_address(address: &str) -> String {
    abbreviate(address, 6, 4)
}

fn abbreviate(value: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= head + tail {
        return value.to_string();
    }
    let start: String = chars.iter().take(head).collect();
    let end: String = chars.iter().skip(chars.len() - tail).collect();
    format!("{start}...{end}")
}
