//! Provider trait — the abstraction over hosted LLM backends.
//!
//! A Provider takes a fully rendered prompt and returns the model's reply.
//! The orchestrator only ever sees this trait, so tests swap in scripted
//! providers and the binary wires up the OpenAI-compatible HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

/// The hosted models a session can talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatModel {
    #[default]
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,
    #[serde(rename = "llama-4-maverick-17b-128e-instruct")]
    Llama4Maverick,
}

impl ChatModel {
    pub const ALL: [ChatModel; 2] = [ChatModel::Gemini20Flash, ChatModel::Llama4Maverick];

    /// The model identifier sent to the API.
    pub fn id(self) -> &'static str {
        match self {
            ChatModel::Gemini20Flash => "gemini-2.0-flash",
            ChatModel::Llama4Maverick => "llama-4-maverick-17b-128e-instruct",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ChatModel::Gemini20Flash => "Gemini 2.0 Flash",
            ChatModel::Llama4Maverick => "LLaMA 4 Maverick",
        }
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned when a model id is not one of the supported models.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model '{0}'")]
pub struct UnknownModel(pub String);

impl FromStr for ChatModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChatModel::ALL
            .into_iter()
            .find(|m| m.id() == s.trim())
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// The role of a message sent to the model. A rendered prompt always
/// travels as the user's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A single message in a provider request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model identifier (e.g., "gemini-2.0-flash")
    pub model: String,

    /// The messages to send; a rendered prompt travels as one user message
    pub messages: Vec<PromptMessage>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl ProviderRequest {
    /// Build a completion request for a single rendered prompt.
    pub fn from_prompt(prompt: impl Into<String>, model: ChatModel, temperature: f32) -> Self {
        Self {
            model: model.id().to_string(),
            messages: vec![PromptMessage::user(prompt)],
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated text
    pub content: String,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The orchestrator calls `complete()` once per user message and awaits it
/// to completion; there is no retry at this layer.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "euron").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;

    /// List available models for this provider.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(ChatModel::ALL.iter().map(|m| m.id().to_string()).collect())
    }

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
