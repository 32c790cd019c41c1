//! In-memory session store
//!
//! Holds each session's transcript and latest state. Nothing survives a
//! restart.

use crate::runtime::{MessageStore, StateStore};
use crate::session::ChatState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Opening assistant message of every session
pub const GREETING: &str = "Hello! I'm your Web3 assistant. I can help you interact with smart contracts on the BlockDAG Primordial Testnet. Try saying something like:\n\n• 'Swap 100 USDC for ETH'\n• 'Mint an NFT on collection 0x123...'\n• 'Delegate 50 tokens to validator xyz'\n\nWhat would you like to do?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Assistant,
}

/// A transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct SessionRecord {
    messages: Vec<Message>,
    state: ChatState,
    created_at: Option<DateTime<Utc>>,
}

/// Summary row for session listings
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub message_count: usize,
    pub created_at: Option<DateTime<Utc>>,
}

/// Shared in-memory store for all sessions
#[derive(Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<Mutex<HashMap<String, SessionRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionRecord>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a session and seed its greeting
    pub fn create_session(&self, session_id: &str) -> Result<Message, String> {
        let mut sessions = self.lock();
        if sessions.contains_key(session_id) {
            return Err(format!("Session already exists: {session_id}"));
        }
        let now = Utc::now();
        let greeting = new_message(session_id, Author::Assistant, GREETING, now);
        sessions.insert(
            session_id.to_string(),
            SessionRecord {
                messages: vec![greeting.clone()],
                state: ChatState::default(),
                created_at: Some(now),
            },
        );
        Ok(greeting)
    }

    /// Drop a session's transcript and state; false if it was unknown
    pub fn remove_session(&self, session_id: &str) -> bool {
        self.lock().remove(session_id).is_some()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.lock().contains_key(session_id)
    }

    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let mut list: Vec<SessionSummary> = self
            .lock()
            .iter()
            .map(|(id, record)| SessionSummary {
                id: id.clone(),
                message_count: record.messages.len(),
                created_at: record.created_at,
            })
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }
}

fn new_message(session_id: &str, author: Author, content: &str, at: DateTime<Utc>) -> Message {
    Message {
        id: uuid::Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        author,
        content: content.to_string(),
        created_at: at,
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn add_message(
        &self,
        session_id: &str,
        author: Author,
        content: &str,
    ) -> Result<Message, String> {
        let mut sessions = self.lock();
        let record = sessions
            .get_mut(session_id)
            .ok_or_else(|| format!("Session not found: {session_id}"))?;
        let msg = new_message(session_id, author, content, Utc::now());
        record.messages.push(msg.clone());
        Ok(msg)
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, String> {
        self.lock()
            .get(session_id)
            .map(|r| r.messages.clone())
            .ok_or_else(|| format!("Session not found: {session_id}"))
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn update_state(&self, session_id: &str, state: &ChatState) -> Result<(), String> {
        let mut sessions = self.lock();
        let record = sessions
            .get_mut(session_id)
            .ok_or_else(|| format!("Session not found: {session_id}"))?;
        record.state = state.clone();
        Ok(())
    }

    async fn get_state(&self, session_id: &str) -> Result<ChatState, String> {
        self.lock()
            .get(session_id)
            .map(|r| r.state.clone())
            .ok_or_else(|| format!("Session not found: {session_id}"))
    }
}
