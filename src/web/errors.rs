use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::shortener::AllocationError;

/// Application error type for web handlers.
#[derive(Debug)]
pub enum AppError {
    Allocation(AllocationError),
    /// Request body that is present but is not a shorten request.
    MalformedBody(String),
    /// Stored data that cannot be expressed in the response, e.g. a URL with
    /// control characters used as a `Location` header.
    Unprocessable(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Allocation(err) => match err {
                AllocationError::InvalidInput => StatusCode::BAD_REQUEST,
                AllocationError::NotFound { .. } => StatusCode::NOT_FOUND,
                AllocationError::Conflict { .. } => StatusCode::CONFLICT,
                AllocationError::ExhaustedRetries { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                AllocationError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            AppError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Allocation(err) => err.kind(),
            AppError::MalformedBody(_) => "malformed_body",
            AppError::Unprocessable(_) => "unprocessable",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Allocation(err) => err.to_string(),
            AppError::MalformedBody(msg) => format!("malformed request body: {msg}"),
            AppError::Unprocessable(msg) => msg.clone(),
        }
    }
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        AppError::Allocation(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %message, "request failed");
        }
        let body = json!({
            "error": message,
            "kind": self.kind(),
        });
        (status, Json(body)).into_response()
    }
}
