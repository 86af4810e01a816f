//! LLM Provider implementations for Palaver.
//!
//! All providers implement the `palaver_core::Provider` trait.
//! [`build_from_config`] wires the configured endpoint and token together.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;

use palaver_config::{AppConfig, ConfigError};
use palaver_core::Provider;

/// Build the model client from configuration.
///
/// Fails with [`ConfigError::MissingCredential`] when no token is configured,
/// so an unauthenticated client is never constructed.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ConfigError> {
    let api_key = config.require_api_key()?;
    let provider = OpenAiCompatProvider::new("euron", &config.api_url, api_key)
        .map_err(|e| ConfigError::ValidationError(format!("HTTP client: {e}")))?;
    Ok(Arc::new(provider))
}
