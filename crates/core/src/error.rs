//! Error types for the Palaver domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Configuration problems and model-client failures are the only two
//! categories that reach callers; `EmptyInput` is boundary validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The top-level error type for all Palaver operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Input validation ---
    #[error("Message is empty")]
    EmptyInput,
}

impl Error {
    /// Shorthand for an invalid-configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// A message suitable for showing to the person chatting.
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(e) => e.user_message(),
            Self::Config { message } => format!("Invalid settings: {message}"),
            Self::EmptyInput => "Type a message before sending.".into(),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Model client errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Coarse classification of a model-client failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelErrorKind {
    Network,
    Auth,
    RateLimit,
    Unknown,
}

impl ProviderError {
    pub fn kind(&self) -> ModelErrorKind {
        match self {
            Self::Network(_) | Self::Timeout(_) => ModelErrorKind::Network,
            Self::AuthenticationFailed(_) => ModelErrorKind::Auth,
            Self::RateLimited { .. } => ModelErrorKind::RateLimit,
            Self::ApiError { .. } | Self::InvalidResponse(_) => ModelErrorKind::Unknown,
        }
    }

    /// Human-readable text for the chat surface.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) | Self::Timeout(_) => {
                format!("Could not reach the model service ({self}). Please try again.")
            }
            Self::AuthenticationFailed(_) => {
                "The model service rejected the API token. Check EURON_API_TOKEN.".into()
            }
            Self::RateLimited { retry_after_secs } => format!(
                "The model service is rate limiting requests. Try again in {retry_after_secs}s."
            ),
            Self::ApiError { .. } | Self::InvalidResponse(_) => format!("Error: {self}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 500,
            message: "upstream exploded".into(),
        });
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[test]
    fn provider_error_kinds() {
        assert_eq!(
            ProviderError::Network("refused".into()).kind(),
            ModelErrorKind::Network
        );
        assert_eq!(
            ProviderError::Timeout("120s".into()).kind(),
            ModelErrorKind::Network
        );
        assert_eq!(
            ProviderError::AuthenticationFailed("bad key".into()).kind(),
            ModelErrorKind::Auth
        );
        assert_eq!(
            ProviderError::RateLimited { retry_after_secs: 3 }.kind(),
            ModelErrorKind::RateLimit
        );
        assert_eq!(
            ProviderError::InvalidResponse("no choices".into()).kind(),
            ModelErrorKind::Unknown
        );
    }

    #[test]
    fn user_messages_are_descriptive() {
        let err = Error::from(ProviderError::RateLimited {
            retry_after_secs: 7,
        });
        assert!(err.user_message().contains("7s"));

        let err = Error::config("memory_turns must be between 1 and 10, got 0");
        assert!(err.user_message().contains("between 1 and 10"));
        assert!(Error::EmptyInput.user_message().contains("Type a message"));
    }
}
