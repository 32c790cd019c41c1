//! Session runtime executor

use super::traits::Storage;
use super::{RuntimeLimits, SseEvent};

use crate::backend::{
    ClassifyError, IntentClassifier, SubmitError, TransactionSubmitter, WALLET_ADDRESS,
};
use crate::session::transition::VOICE_TRANSCRIPT;
use crate::session::{transition, ChatState, Effect, Event, SessionContext, TransitionError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Generic session runtime that can work with any storage, classifier, and submitter
pub struct SessionRuntime<S, C, X>
where
    S: Storage + Clone + 'static,
    C: IntentClassifier + 'static,
    X: TransactionSubmitter + 'static,
{
    context: SessionContext,
    state: ChatState,
    storage: S,
    classifier: Arc<C>,
    submitter: Arc<X>,
    limits: RuntimeLimits,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    /// Stops the event loop on server shutdown
    shutdown: CancellationToken,
}

impl<S, C, X> SessionRuntime<S, C, X>
where
    S: Storage + Clone + 'static,
    C: IntentClassifier + 'static,
    X: TransactionSubmitter + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: SessionContext,
        state: ChatState,
        storage: S,
        classifier: C,
        submitter: X,
        limits: RuntimeLimits,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<SseEvent>,
    ) -> Self {
        Self {
            context,
            state,
            storage,
            classifier: Arc::new(classifier),
            submitter: Arc::new(submitter),
            limits,
            event_rx,
            event_tx,
            broadcast_tx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Stop the loop when `token` is cancelled
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting session runtime");

        // Process events in a loop - one at a time, in arrival order
        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => break,
                Some(event) = self.event_rx.recv() => {
                    if let Err(e) = self.process_event(event).await {
                        tracing::error!(error = %e, "Error handling event");
                        let _ = self.broadcast_tx.send(SseEvent::Error {
                            message: e.clone(),
                        });
                    }
                }
                else => break,
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Session runtime stopped");
    }

    async fn process_event(&mut self, event: Event) -> Result<(), String> {
        let event_name = event.name();
        if let Event::ClassificationComplete { intent, .. } = &event {
            tracing::info!(
                session_id = %self.context.session_id,
                intent = intent.as_str(),
                "Intent classified"
            );
        }

        // Pure state transition
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                // Refused events leave the session untouched
                log_refusal(&self.context.session_id, event_name, &e);
                return Ok(());
            }
        };

        tracing::debug!(
            session_id = %self.context.session_id,
            event = event_name,
            from = self.state.activity_name(),
            to = result.new_state.activity_name(),
            "Transition"
        );

        // Update state
        self.state = result.new_state;

        // Execute effects in order
        for effect in result.effects {
            self.execute_effect(effect).await?;
        }

        Ok(())
    }

    /// Execute an effect
    async fn execute_effect(&mut self, effect: Effect) -> Result<(), String> {
        match effect {
            Effect::AppendMessage { author, content } => {
                let message = self
                    .storage
                    .add_message(&self.context.session_id, author, &content)
                    .await?;
                let _ = self.broadcast_tx.send(SseEvent::Message { message });
                Ok(())
            }

            Effect::PersistState => {
                self.storage
                    .update_state(&self.context.session_id, &self.state)
                    .await?;
                let _ = self.broadcast_tx.send(SseEvent::StateChange {
                    state: self.state.clone(),
                });
                Ok(())
            }

            Effect::RequestClassification { text, attempt } => {
                let classifier = self.classifier.clone();
                let event_tx = self.event_tx.clone();
                let timeout = self.limits.classify_timeout;

                // Spawn classification as background task
                tokio::spawn(async move {
                    tracing::info!(attempt, "Classifying request (background)");

                    let outcome = match tokio::time::timeout(timeout, classifier.classify(&text))
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => Err(ClassifyError::timeout(format!(
                            "no answer within {}s",
                            timeout.as_secs()
                        ))),
                    };

                    let event = match outcome {
                        Ok(classification) => Event::ClassificationComplete {
                            intent: classification.intent,
                            reply: classification.reply,
                            transaction: classification.transaction,
                        },
                        Err(e) => Event::ClassificationFailed {
                            message: e.message,
                            error_kind: e.kind,
                            attempt,
                        },
                    };
                    let _ = event_tx.send(event).await;
                });
                Ok(())
            }

            Effect::ScheduleRetry { delay, attempt } => {
                tracing::info!(
                    attempt,
                    delay_ms = %delay.as_millis(),
                    "Scheduling classification retry"
                );
                self.send_after(delay, Event::RetryTimeout { attempt });
                Ok(())
            }

            Effect::SubmitTransaction { transaction } => {
                let submitter = self.submitter.clone();
                let event_tx = self.event_tx.clone();
                let timeout = self.limits.submit_timeout;

                // Spawn submission as background task. It is never aborted.
                tokio::spawn(async move {
                    tracing::info!(
                        function = %transaction.function_name,
                        "Submitting transaction (background)"
                    );

                    let outcome =
                        match tokio::time::timeout(timeout, submitter.submit(&transaction)).await {
                            Ok(outcome) => outcome,
                            Err(_) => Err(SubmitError::timeout(format!(
                                "no receipt within {}s",
                                timeout.as_secs()
                            ))),
                        };

                    let event = match outcome {
                        Ok(receipt) => Event::SubmissionComplete {
                            tx_hash: receipt.tx_hash,
                        },
                        Err(e) => Event::SubmissionFailed {
                            message: e.message,
                            error_kind: e.kind,
                        },
                    };
                    let _ = event_tx.send(event).await;
                });
                Ok(())
            }

            Effect::ScheduleVoiceTranscript { delay } => {
                self.send_after(
                    delay,
                    Event::VoiceTranscript {
                        text: VOICE_TRANSCRIPT.to_string(),
                    },
                );
                Ok(())
            }

            Effect::ScheduleWalletHandshake { delay, handshake } => {
                self.send_after(
                    delay,
                    Event::WalletConnected {
                        address: WALLET_ADDRESS.to_string(),
                        handshake,
                    },
                );
                Ok(())
            }

            Effect::Notify(toast) => {
                let _ = self.broadcast_tx.send(SseEvent::Toast { toast });
                Ok(())
            }
        }
    }

    /// Deliver `event` to this runtime after `delay`
    fn send_after(&self, delay: std::time::Duration, event: Event) {
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = event_tx.send(event).await;
        });
    }
}

fn log_refusal(session_id: &str, event: &str, error: &TransitionError) {
    match error {
        TransitionError::InvalidTransition(_) => {
            tracing::warn!(session_id = %session_id, event, error = %error, "Event ignored");
        }
        _ => {
            tracing::debug!(session_id = %session_id, event, reason = %error, "Event refused");
        }
    }
}
