//! hsa-core: Home Security Assistant Core Library
//!
//! Gemini API client, per-client conversation sessions and the chat
//! dispatch service that ties them together.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;

pub use chat::{BackendFactory, ChatService, GeminiFactory, SYSTEM_INSTRUCTION};
pub use config::{Config, GeminiConfig, ServerConfig, SessionConfig};
pub use error::{Error, Result};
pub use llm::{ChatBackend, Content, GeminiClient, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};
pub use session::{Session, SessionRegistry};
