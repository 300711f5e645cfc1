//! HTTP API Server
//!
//! Builds the router and runs the axum server.

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use hsa_core::{ChatService, Config};

use crate::handlers::ErrorResponse;
use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(config: Config, chat: ChatService) -> Self {
        Self {
            config,
            chat: Arc::new(chat),
        }
    }
}

/// Build the application router
///
/// Unmatched paths are served from the configured static directory.
pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .merge(routes())
        .fallback_service(static_files)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Request handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal Server Error".to_string(),
        }),
    )
        .into_response()
}

/// Start the HTTP API server
pub async fn start_server(config: Config, chat: ChatService) -> anyhow::Result<()> {
    let port = config.server.port;
    let app_name = config.server.app_name.clone();
    let app = app(AppState::new(config, chat));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("{} listening on {}", app_name, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
