//! Router construction and the serve loop.

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers::{call_handler, empty_call_handler, health_handler, AppState};
use crate::error::{ApiError, Result};

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Named calls
        .route("/api/:call", get(call_handler))
        // No call segment
        .route("/api", get(empty_call_handler))
        .route("/api/", get(empty_call_handler))
        // Health check
        .route("/health", get(health_handler))
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves requests on `listener` until the process receives Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = router(Arc::new(state));

    if let Ok(addr) = listener.local_addr() {
        info!("HTTP server listening on {}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal(format!("HTTP server failed: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
