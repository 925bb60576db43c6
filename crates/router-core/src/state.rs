//! Conversation state: the small per-session memory the follow-up resolver
//! and smart-fork rule read from, and the router writes to after every
//! non-CLARIFY decision. Store shape follows the teacher's
//! `rust::api::session::{SessionStore, create_session_store}` —
//! `Arc<RwLock<HashMap<Uuid, _>>>` with mutator methods that always bump
//! `updated_at`.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct LastTurn {
    pub last_intent: Option<String>,
    pub last_bank: Option<String>,
    pub last_category: Option<String>,
    pub last_product_list: Vec<String>,
    pub last_utterance: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LastTurn {
    pub fn is_expired(&self, ttl: Duration) -> bool {
        match self.updated_at {
            None => false,
            Some(updated_at) => {
                let age = Utc::now().signed_duration_since(updated_at);
                age.to_std().map(|age| age > ttl).unwrap_or(false)
            }
        }
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    pub fn record_committed_turn(
        &mut self,
        intent: impl Into<String>,
        bank: Option<String>,
        category: Option<String>,
        utterance: impl Into<String>,
    ) {
        self.last_intent = Some(intent.into());
        self.last_bank = bank;
        self.last_category = category;
        self.last_utterance = Some(utterance.into());
        self.touch();
    }

    pub fn record_product_list(&mut self, names: Vec<String>) {
        self.last_product_list = names;
        self.touch();
    }
}

pub type ConversationStore = Arc<RwLock<HashMap<Uuid, LastTurn>>>;

pub fn create_conversation_store() -> ConversationStore {
    Arc::new(RwLock::new(HashMap::new()))
}

/// Fetch a session's memory, treating an expired or missing entry as fresh.
pub async fn get_last_turn(store: &ConversationStore, session_id: Uuid, ttl: Duration) -> LastTurn {
    let sessions = store.read().await;
    match sessions.get(&session_id) {
        Some(turn) if !turn.is_expired(ttl) => turn.clone(),
        _ => LastTurn::default(),
    }
}

pub async fn commit_last_turn(store: &ConversationStore, session_id: Uuid, turn: LastTurn) {
    store.write().await.insert(session_id, turn);
}

/// Drop a session's memory outright — "new conversation".
pub async fn clear_session(store: &ConversationStore, session_id: Uuid) {
    store.write().await.remove(&session_id);
}
