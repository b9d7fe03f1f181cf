//! JSON rendering of call results and errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ApiError;

/// Body returned when no call name is given.
pub const UNKNOWN_CALL_MESSAGE: &str = "Unknown API call";

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: ErrorMessage<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorMessage<'a> {
    message: &'a str,
}

impl ApiError {
    /// HTTP status for this error when it ends a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Binding(_) => StatusCode::BAD_REQUEST,
            Self::Execution(_)
            | Self::UnsupportedType { .. }
            | Self::Internal(_)
            | Self::Config(_)
            | Self::Connection(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let body = ErrorBody {
            error: ErrorMessage { message: &message },
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// The fixed response for an empty call name. Not an error object.
pub fn unknown_call() -> Response {
    (StatusCode::OK, Json(UNKNOWN_CALL_MESSAGE)).into_response()
}
