//! Session types

use chrono::{DateTime, Utc};

use crate::llm::Content;

/// A client's conversation with the assistant
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Client identity (peer address) this session belongs to
    pub identity: String,
    /// Transcript, oldest first. Append-only.
    history: Vec<Content>,
    /// Session creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session for a client
    pub fn new(identity: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            identity: identity.into(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Transcript turns, oldest first
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Record one completed exchange: the user turn, then the model turn
    pub fn append_exchange(&mut self, user_message: impl Into<String>, reply: impl Into<String>) {
        self.history.push(Content::user(user_message));
        self.history.push(Content::model(reply));
        self.updated_at = Utc::now();
    }

    /// Number of turns in the transcript
    pub fn turn_count(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
