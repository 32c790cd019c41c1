//! Runtime for executing chat sessions
//!
//! Each session runs its own event loop; `SessionManager` creates them and
//! routes user actions to the right one.

mod executor;
pub mod traits;


pub use executor::SessionRuntime;
pub use traits::*;

use crate::backend::{IntentClassifier, LoggingClassifier, LoggingSubmitter, TransactionSubmitter};
use crate::config::Config;
use crate::session::{ChatState, Event, SessionContext, Toast};
use crate::store::{MemoryStore, Message};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_util::sync::CancellationToken;

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = SessionRuntime<MemoryStore, LoggingClassifier, LoggingSubmitter>;

/// Upper bounds on backend calls
#[derive(Debug, Clone, Copy)]
pub struct RuntimeLimits {
    pub classify_timeout: Duration,
    pub submit_timeout: Duration,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self {
            classify_timeout: Duration::from_secs(30),
            submit_timeout: Duration::from_secs(60),
        }
    }
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Message { message: Message },
    StateChange { state: ChatState },
    Toast { toast: Toast },
    Error { message: String },
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<SseEvent>,
    /// Stops this session's runtime
    pub shutdown: CancellationToken,
}

/// Manager for all session runtimes
pub struct SessionManager {
    store: MemoryStore,
    classifier: Arc<dyn IntentClassifier>,
    submitter: Arc<dyn TransactionSubmitter>,
    config: Config,
    runtimes: RwLock<HashMap<String, SessionHandle>>,
    shutdown: CancellationToken,
}

impl SessionManager {
    pub fn new(
        store: MemoryStore,
        classifier: Arc<dyn IntentClassifier>,
        submitter: Arc<dyn TransactionSubmitter>,
        config: Config,
    ) -> Self {
        Self {
            store,
            classifier,
            submitter,
            config,
            runtimes: RwLock::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Create a session and start its runtime
    pub async fn create(&self) -> Result<String, String> {
        let session_id = uuid::Uuid::new_v4().to_string();
        self.store.create_session(&session_id)?;

        let context = SessionContext::new(&session_id)
            .with_delays(self.config.voice_delay, self.config.wallet_delay);

        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let shutdown = self.shutdown.child_token();

        let runtime: ProductionRuntime = SessionRuntime::new(
            context,
            ChatState::default(),
            self.store.clone(),
            LoggingClassifier::new(self.classifier.clone()),
            LoggingSubmitter::new(self.submitter.clone()),
            self.config.limits(),
            event_rx,
            event_tx.clone(),
            broadcast_tx.clone(),
        )
        .with_shutdown(shutdown.clone());

        // Start runtime in background
        let id = session_id.clone();
        tokio::spawn(async move {
            runtime.run().await;
            tracing::info!(session_id = %id, "Session runtime finished");
        });

        self.runtimes.write().await.insert(
            session_id.clone(),
            SessionHandle {
                event_tx,
                broadcast_tx,
                shutdown,
            },
        );

        tracing::info!(session_id = %session_id, "Session created");
        Ok(session_id)
    }

    async fn handle(&self, session_id: &str) -> Result<SessionHandle, String> {
        self.runtimes
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| format!("Session not found: {session_id}"))
    }

    /// Send an event to a session
    pub async fn send_event(&self, session_id: &str, event: Event) -> Result<(), String> {
        let handle = self.handle(session_id).await?;
        handle
            .event_tx
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }

    /// Stop a session's runtime and forget its transcript
    pub async fn remove(&self, session_id: &str) -> Result<(), String> {
        let handle = self
            .runtimes
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| format!("Session not found: {session_id}"))?;
        handle.shutdown.cancel();
        self.store.remove_session(session_id);

        tracing::info!(session_id = %session_id, "Session removed");
        Ok(())
    }

    /// Subscribe to session updates
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<broadcast::Receiver<SseEvent>, String> {
        let handle = self.handle(session_id).await?;
        Ok(handle.broadcast_tx.subscribe())
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Stop every session loop
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
