//! Gemini API client and types

mod client;
mod types;

pub use client::{ChatBackend, GeminiClient};
pub use types::*;
