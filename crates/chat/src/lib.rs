//! Conversation orchestration for Palaver.
//!
//! - [`Orchestrator`]: persona template + memory window → one model call → new turn
//! - [`Session`]: explicit per-user context (history, settings, timing)
//! - [`SessionRegistry`]: isolated sessions for the multi-user server

pub mod orchestrator;
pub mod registry;
pub mod session;

pub use orchestrator::Orchestrator;
pub use registry::{MAX_SESSIONS, SessionRegistry, SharedSession};
pub use session::{Session, SessionSettings, SessionSnapshot, SessionStats};
