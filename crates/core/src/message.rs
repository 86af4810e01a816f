//! Turn and session identifier domain types.
//!
//! A turn is the unit everything else is built from:
//! user sends text → orchestrator calls the model → the pair becomes a `Turn`
//! appended to the session history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One human message paired with the assistant's reply.
///
/// Fields are private: a turn never changes after the orchestrator creates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    human: String,
    ai: String,
    created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(human: impl Into<String>, ai: impl Into<String>) -> Self {
        Self {
            human: human.into(),
            ai: ai.into(),
            created_at: Utc::now(),
        }
    }

    pub fn human(&self) -> &str {
        &self.human
    }

    pub fn ai(&self) -> &str {
        &self.ai
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
