//! Request handlers and shared application state.
//!
//! `/api/:call` never matches an empty segment; `/api` and `/api/` are routed
//! to [`empty_call_handler`] instead.

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::response::unknown_call;
use crate::error::ApiError;
use crate::query::{Dispatcher, ParameterSet};

pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

// Call handler: GET /api/{call}
pub async fn call_handler(
    Path(call): Path<String>,
    RawQuery(query): RawQuery,
    State(state): State<Arc<AppState>>,
) -> Response {
    let params = ParameterSet::from_query_string(query.as_deref().unwrap_or_default());
    info!("API call: call={}, params={}", call, params.len());

    match state.dispatcher.dispatch(&call, &params).await {
        Ok(rows) => {
            info!("API call completed: call={}, rows={}", call, rows.len());
            (StatusCode::OK, Json(rows)).into_response()
        }
        Err(e) => {
            log_failure(&call, &e);
            e.into_response()
        }
    }
}

// Empty call handler: GET /api and GET /api/
pub async fn empty_call_handler() -> Response {
    unknown_call()
}

// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

fn log_failure(call: &str, e: &ApiError) {
    match e {
        ApiError::NotFound(_) | ApiError::Binding(_) => {
            warn!("API call failed: call={}, {}: {}", call, e.category(), e)
        }
        _ => error!("API call failed: call={}, {}: {}", call, e.category(), e),
    }
}
