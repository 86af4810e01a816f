//! The conversation orchestrator.
//!
//! Combines the session's persona template and memory window into a single
//! prompt, calls the model once, and appends the resulting turn to the
//! session history. The orchestrator itself keeps no per-session state: the
//! window is rebuilt from history on every call.

use std::sync::Arc;

use chrono::Utc;
use palaver_config::AppConfig;
use palaver_core::{Error, Provider, ProviderRequest, Result, Turn};
use tracing::{debug, info, warn};

use crate::session::Session;

/// Turns user messages into model calls for any number of sessions.
pub struct Orchestrator {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// Temperature setting
    temperature: f32,

    /// Optional cap on generated tokens
    max_tokens: Option<u32>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn Provider>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens: None,
        }
    }

    /// Build from configuration (temperature and token cap).
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(provider, config.temperature).with_max_tokens(config.max_tokens)
    }

    /// Set the max tokens per response.
    pub fn with_max_tokens(mut self, max: Option<u32>) -> Self {
        self.max_tokens = max;
        self
    }

    /// Render the full prompt the next call for `user_text` would send.
    pub fn build_prompt(&self, session: &Session, user_text: &str) -> Result<String> {
        let window = session.memory_window()?;
        let template = session.settings().persona.template();
        Ok(template.format(&window.render(), user_text))
    }

    /// Send one user message and record the reply.
    ///
    /// On a model failure the session history is left exactly as it was and
    /// the error is returned for display; the session stays usable.
    pub async fn respond(&self, session: &mut Session, user_text: &str) -> Result<Turn> {
        if user_text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let settings = session.settings();
        session.mark_started(Utc::now());

        let prompt = self.build_prompt(session, user_text)?;
        debug!(
            session = %session.id(),
            persona = %settings.persona,
            model = %settings.model,
            prompt_len = prompt.len(),
            "Built prompt"
        );

        let request = ProviderRequest::from_prompt(prompt, settings.model, self.temperature)
            .with_max_tokens(self.max_tokens);

        match self.provider.complete(request).await {
            Ok(response) => {
                let turn = Turn::new(user_text, response.content);
                session.push_turn(turn.clone());
                info!(
                    session = %session.id(),
                    turns = session.history().len(),
                    "Recorded turn"
                );
                Ok(turn)
            }
            Err(e) => {
                warn!(session = %session.id(), kind = ?e.kind(), error = %e, "Model call failed");
                Err(Error::Provider(e))
            }
        }
    }
}
