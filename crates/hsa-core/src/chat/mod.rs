//! Chat dispatch
//!
//! Turns one (client identity, message) pair into one reply and records the
//! exchange in that client's session.

mod prompt;
mod service;

pub use prompt::SYSTEM_INSTRUCTION;
pub use service::{BackendFactory, ChatService, GeminiFactory};
