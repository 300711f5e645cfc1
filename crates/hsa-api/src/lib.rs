//! hsa-api: HTTP API for the Home Security Assistant
//!
//! Serves the chat endpoint and the static front-end.
//! Built with axum for async HTTP handling.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{AppState, app, start_server};
