//! HTTP API handlers

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::server::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Chat request payload
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User message
    #[serde(default)]
    pub message: String,
}

/// Chat response payload
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Assistant reply text
    pub response: String,
}

/// Generic API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handler functions
// ============================================================================

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Chat endpoint - send a message to the assistant
///
/// The caller's IP address selects the conversation session.
pub async fn chat(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(req) = payload?;

    let identity = client_identity(&addr);
    debug!("Chat request from {}: {} chars", identity, req.message.len());

    let response = state.chat.dispatch(&identity, &req.message).await?;

    Ok(Json(ChatResponse { response }))
}

/// Session key for a peer: its IP address without the port
pub fn client_identity(addr: &SocketAddr) -> String {
    addr.ip().to_canonical().to_string()
}
