//! # Palaver Core
//!
//! Domain types, traits, and error definitions for the Palaver conversational
//! chat. This crate has **no framework dependencies**: it defines the turn and
//! history model, the persona catalog, the bounded conversational memory, and
//! the model-client trait that every other crate builds against.
//!
//! ## Layout
//!
//! - [`message`]: `Turn` and its identifiers
//! - [`persona`]: closed persona set and prompt templates
//! - [`memory`]: `MemoryWindow`, the sliding window replayed into prompts
//! - [`provider`]: the `Provider` trait over hosted LLM backends
//! - [`error`]: error taxonomy shared by all crates

pub mod error;
pub mod memory;
pub mod message;
pub mod persona;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ModelErrorKind, ProviderError, Result};
pub use memory::{
    MAX_MEMORY_TURNS, MIN_MEMORY_TURNS, MemoryWindow, parse_rendered, validate_memory_turns,
};
pub use message::{SessionId, Turn};
pub use persona::{Persona, PromptTemplate, UnknownPersona};
pub use provider::{
    ChatModel, PromptMessage, Provider, ProviderRequest, ProviderResponse, Role, UnknownModel,
    Usage,
};
