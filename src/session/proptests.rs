//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::backend::{ClassifyErrorKind, SubmitErrorKind};
use crate::intent::IntentKind;
use crate::store::Author;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("test-session")
}

fn count_appended(effects: &[Effect], author: Author) -> usize {
    effects
        .iter()
        .filter(|e| e.appended_author() == Some(author))
        .count()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_tx() -> impl Strategy<Value = PendingTransaction> {
    (
        "[a-zA-Z]{3,20}",
        "0x[0-9a-f]{40}",
        proptest::collection::vec(("[a-zA-Z]{1,10}", "[a-zA-Z0-9 ]{0,20}"), 0..5),
    )
        .prop_map(|(function_name, contract_address, params)| PendingTransaction {
            function_name,
            contract_address,
            parameters: params
                .into_iter()
                .map(|(n, v)| TxParameter::new(n, v))
                .collect(),
            estimated_gas: "21,000 gas".to_string(),
        })
}

fn arb_classify_error_kind() -> impl Strategy<Value = ClassifyErrorKind> {
    prop_oneof![
        Just(ClassifyErrorKind::Network),
        Just(ClassifyErrorKind::Timeout),
        Just(ClassifyErrorKind::MalformedIntent),
        Just(ClassifyErrorKind::LowConfidence),
        Just(ClassifyErrorKind::Unavailable),
    ]
}

fn arb_submit_error_kind() -> impl Strategy<Value = SubmitErrorKind> {
    prop_oneof![
        Just(SubmitErrorKind::Rejected),
        Just(SubmitErrorKind::InsufficientFunds),
        Just(SubmitErrorKind::Timeout),
    ]
}

fn arb_wallet() -> impl Strategy<Value = WalletStatus> {
    prop_oneof![
        Just(WalletStatus::Disconnected),
        (1..4u32).prop_map(|handshake| WalletStatus::Connecting { handshake }),
        "0x[0-9a-f]{40}".prop_map(|address| WalletStatus::Connected { address }),
    ]
}

/// States reachable by the machine: submitting always has a pending slot
fn arb_state() -> impl Strategy<Value = ChatState> {
    let activity_and_pending = prop_oneof![
        proptest::option::of(arb_tx()).prop_map(|p| (Activity::Idle, p)),
        ("[a-z ]{1,20}", 1..=MAX_CLASSIFY_ATTEMPTS, proptest::option::of(arb_tx()))
            .prop_map(|(text, attempt, p)| (Activity::Classifying { text, attempt }, p)),
        arb_tx().prop_map(|tx| (Activity::Submitting, Some(tx))),
        Just((Activity::CancellingSubmission, None)),
    ];
    (activity_and_pending, any::<bool>(), "[a-z ]{0,10}", arb_wallet()).prop_map(
        |((activity, pending), voice_capturing, draft, wallet)| ChatState {
            activity,
            pending,
            voice_capturing,
            draft,
            wallet_handshakes: match wallet {
                WalletStatus::Connecting { handshake } => handshake,
                _ => 0,
            },
            wallet,
        },
    )
}

fn arb_busy_state() -> impl Strategy<Value = ChatState> {
    arb_state().prop_filter("busy", ChatState::is_busy)
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z ]{0,30}".prop_map(|text| Event::UserMessage { text }),
        Just(Event::ConfirmPending),
        Just(Event::RejectPending),
        Just(Event::ToggleVoiceCapture),
        Just(Event::ConnectWallet),
        Just(Event::DisconnectWallet),
        ("[a-z ]{1,20}", proptest::option::of(arb_tx())).prop_map(|(reply, transaction)| {
            Event::ClassificationComplete {
                intent: IntentKind::Unrecognized,
                reply,
                transaction,
            }
        }),
        (arb_classify_error_kind(), 1..=MAX_CLASSIFY_ATTEMPTS).prop_map(|(error_kind, attempt)| {
            Event::ClassificationFailed {
                message: "failed".to_string(),
                error_kind,
                attempt,
            }
        }),
        (1..=MAX_CLASSIFY_ATTEMPTS).prop_map(|attempt| Event::RetryTimeout { attempt }),
        "0x[0-9a-f]{64}".prop_map(|tx_hash| Event::SubmissionComplete { tx_hash }),
        arb_submit_error_kind().prop_map(|error_kind| Event::SubmissionFailed {
            message: "failed".to_string(),
            error_kind,
        }),
        Just(Event::VoiceTranscript {
            text: VOICE_TRANSCRIPT.to_string()
        }),
        ("0x[0-9a-f]{40}", 1..4u32)
            .prop_map(|(address, handshake)| Event::WalletConnected { address, handshake }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Submitting implies a pending transaction, across any event sequence
    #[test]
    fn prop_submitting_implies_pending(
        events in proptest::collection::vec(arb_event(), 0..40)
    ) {
        let ctx = test_context();
        let mut state = ChatState::default();
        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                state = result.new_state;
            }
            prop_assert!(!state.is_submitting() || state.pending.is_some());
        }
    }

    /// Every applied transition appends at most one message
    #[test]
    fn prop_at_most_one_message_per_event(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, &test_context(), event) {
            let total = count_appended(&result.effects, Author::User)
                + count_appended(&result.effects, Author::Assistant);
            prop_assert!(total <= 1);
        }
    }

    /// Text submitted while busy is refused and changes nothing
    #[test]
    fn prop_busy_rejects_user_text(state in arb_busy_state(), text in "[a-zA-Z]{1,20}") {
        let result = transition(&state, &test_context(), Event::UserMessage { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::Busy);
    }

    /// Whitespace-only text is never accepted
    #[test]
    fn prop_blank_text_rejected(state in arb_state(), text in "[ \t\n]{0,10}") {
        let result = transition(&state, &test_context(), Event::UserMessage { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyMessage);
    }

    /// A submit followed by its classification yields one user and one assistant message
    #[test]
    fn prop_one_user_one_assistant_per_submit(
        text in "[a-zA-Z][a-zA-Z ]{0,30}",
        reply in "[a-zA-Z ]{1,30}",
        transaction in proptest::option::of(arb_tx()),
    ) {
        let ctx = test_context();
        let first = transition(&ChatState::default(), &ctx, Event::UserMessage { text }).unwrap();
        let second = transition(
            &first.new_state,
            &ctx,
            Event::ClassificationComplete {
                intent: IntentKind::Unrecognized,
                reply,
                transaction,
            },
        )
        .unwrap();

        let mut effects = first.effects;
        effects.extend(second.effects);
        prop_assert_eq!(count_appended(&effects, Author::User), 1);
        prop_assert_eq!(count_appended(&effects, Author::Assistant), 1);
        prop_assert!(!second.new_state.is_busy());
    }

    /// Repeated classifier failures end with exactly one assistant reply
    #[test]
    fn prop_failures_end_with_one_reply(
        text in "[a-zA-Z]{1,20}",
        kinds in proptest::collection::vec(
            arb_classify_error_kind(),
            MAX_CLASSIFY_ATTEMPTS as usize,
        ),
    ) {
        let ctx = test_context();
        let mut result =
            transition(&ChatState::default(), &ctx, Event::UserMessage { text }).unwrap();
        let mut assistant = 0;
        for kind in kinds {
            let Activity::Classifying { attempt, .. } = result.new_state.activity.clone() else {
                break;
            };
            result = transition(
                &result.new_state,
                &ctx,
                Event::ClassificationFailed {
                    message: "boom".to_string(),
                    error_kind: kind,
                    attempt,
                },
            )
            .unwrap();
            assistant += count_appended(&result.effects, Author::Assistant);
        }
        prop_assert_eq!(result.new_state.activity, Activity::Idle);
        prop_assert_eq!(assistant, 1);
    }

    /// Reject clears the slot and appends exactly one reply, whatever the activity
    #[test]
    fn prop_reject_clears_pending(state in arb_state(), tx in arb_tx()) {
        let state = ChatState { pending: Some(tx), ..state };
        let result = transition(&state, &test_context(), Event::RejectPending).unwrap();
        prop_assert!(result.new_state.pending.is_none());
        prop_assert!(!result.new_state.is_submitting());
        prop_assert_eq!(count_appended(&result.effects, Author::Assistant), 1);

        let again = transition(&result.new_state, &test_context(), Event::RejectPending);
        prop_assert_eq!(again.unwrap_err(), TransitionError::NoPendingTransaction);
    }

    /// Confirm with nothing pending is always refused
    #[test]
    fn prop_confirm_without_pending_refused(state in arb_state()) {
        let state = ChatState { pending: None, ..state };
        let result = transition(&state, &test_context(), Event::ConfirmPending);
        prop_assert_eq!(result.unwrap_err(), TransitionError::NoPendingTransaction);
    }
}
