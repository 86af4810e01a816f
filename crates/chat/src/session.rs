//! Session-scoped chat state.
//!
//! A [`Session`] is the explicit context object handed to the orchestrator:
//! full history, the selected persona / memory length / model, and the
//! timing used for statistics. Nothing here is global, so any number of
//! sessions can live side by side.

use chrono::{DateTime, Utc};
use palaver_config::AppConfig;
use palaver_core::{
    ChatModel, MemoryWindow, Persona, Result, SessionId, Turn, validate_memory_turns,
};
use serde::{Deserialize, Serialize};

/// User-selected options for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub persona: Persona,
    pub memory_turns: usize,
    pub model: ChatModel,
}

impl SessionSettings {
    /// Validated constructor; `memory_turns` must be in `1..=10`.
    pub fn new(persona: Persona, memory_turns: usize, model: ChatModel) -> Result<Self> {
        let settings = Self {
            persona,
            memory_turns,
            model,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults for new sessions taken from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.default_persona,
            config.memory_turns,
            config.default_model,
        )
    }

    pub fn validate(&self) -> Result<()> {
        validate_memory_turns(self.memory_turns)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            persona: Persona::Default,
            memory_turns: 5,
            model: ChatModel::default(),
        }
    }
}

/// Counters shown next to the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub message_count: usize,
    pub memory_in_use: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_secs: Option<u64>,
    /// `"{m}m {s}s"`, absent until the first send.
    pub elapsed: Option<String>,
}

/// One person's conversation.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    history: Vec<Turn>,
    settings: SessionSettings,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    /// Turns before this index are not replayed as memory ("new topic").
    topic_start: usize,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            id: SessionId::new(),
            history: Vec::new(),
            settings,
            created_at: Utc::now(),
            started_at: None,
            topic_start: 0,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Replace the settings; they apply from the next send.
    pub fn update_settings(&mut self, settings: SessionSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// History turns eligible for replay since the last "new topic".
    pub fn replayable_history(&self) -> &[Turn] {
        &self.history[self.topic_start.min(self.history.len())..]
    }

    /// The window the next model call will see, rebuilt from history.
    pub fn memory_window(&self) -> Result<MemoryWindow> {
        MemoryWindow::from_history(self.replayable_history(), self.settings.memory_turns)
    }

    /// Clear the memory window only. History stays as it is.
    pub fn new_topic(&mut self) {
        self.topic_start = self.history.len();
    }

    /// Drop history and memory and reset elapsed-time tracking.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.topic_start = 0;
        self.started_at = None;
    }

    pub(crate) fn mark_started(&mut self, now: DateTime<Utc>) {
        self.started_at.get_or_insert(now);
    }

    pub(crate) fn push_turn(&mut self, turn: Turn) {
        self.history.push(turn);
    }

    pub fn stats(&self, now: DateTime<Utc>) -> SessionStats {
        let elapsed_secs = self
            .started_at
            .map(|start| (now - start).num_seconds().max(0) as u64);
        SessionStats {
            message_count: self.history.len(),
            memory_in_use: self
                .replayable_history()
                .len()
                .min(self.settings.memory_turns),
            started_at: self.started_at,
            elapsed_secs,
            elapsed: elapsed_secs.map(|s| format!("{}m {}s", s / 60, s % 60)),
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.to_string(),
            settings: self.settings,
            history: self.history.clone(),
            stats: self.stats(now),
        }
    }
}

/// Serializable view of a session for the HTTP API.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub settings: SessionSettings,
    pub history: Vec<Turn>,
    pub stats: SessionStats,
}
