//! Trait abstractions for runtime storage
//!
//! These traits enable testing the executor with alternate stores.

use crate::session::ChatState;
use crate::store::{Author, Message};
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for session transcripts
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message; the store assigns id and timestamp
    async fn add_message(
        &self,
        session_id: &str,
        author: Author,
        content: &str,
    ) -> Result<Message, String>;

    /// Get all messages for a session, in append order
    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, String>;
}

/// Storage for session state
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn update_state(&self, session_id: &str, state: &ChatState) -> Result<(), String>;

    async fn get_state(&self, session_id: &str) -> Result<ChatState, String>;
}

/// Combined storage trait for convenience
pub trait Storage: MessageStore + StateStore {}
impl<T: MessageStore + StateStore> Storage for T {}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    async fn add_message(
        &self,
        session_id: &str,
        author: Author,
        content: &str,
    ) -> Result<Message, String> {
        (**self).add_message(session_id, author, content).await
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, String> {
        (**self).get_messages(session_id).await
    }
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn update_state(&self, session_id: &str, state: &ChatState) -> Result<(), String> {
        (**self).update_state(session_id, state).await
    }

    async fn get_state(&self, session_id: &str) -> Result<ChatState, String> {
        (**self).get_state(session_id).await
    }
}
