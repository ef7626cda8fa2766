use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::AppState;
use super::errors::AppError;
use crate::models::{ShortLink, ShortenRequest, ShortenResponse};
use crate::shortener::{AllocationError, Allocator};

const DEFAULT_LIST_LIMIT: u32 = 50;

/// Run a store-backed allocator call on the blocking pool so SQLite I/O
/// never stalls the async workers.
async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Allocator) -> Result<T, AllocationError> + Send + 'static,
    T: Send + 'static,
{
    let allocator = state.allocator.clone();
    let result = tokio::task::spawn_blocking(move || f(&allocator))
        .await
        .map_err(|e| AllocationError::StoreUnavailable(format!("store task failed: {e}")))?;
    Ok(result?)
}

/// Decode a shorten request. A missing body reads as a request without a
/// URL; anything else that is not a JSON object of the right shape is
/// rejected as malformed.
fn parse_shorten_body(body: &[u8]) -> Result<ShortenRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ShortenRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::MalformedBody(e.to_string()))
}

/// Health check for load balancers.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// POST /shorten
pub async fn shorten(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ShortenResponse>, AppError> {
    let req = parse_shorten_body(&body)?;
    let url = req.original_url.unwrap_or_default();
    let link = blocking(&state, move |a| a.allocate(&url)).await?;
    Ok(Json(ShortenResponse::from(&link)))
}

/// GET /go/{short_path}
///
/// URLs are stored unvalidated, so the `Location` value is checked here
/// instead of trusting it to be a legal header.
pub async fn redirect(
    State(state): State<AppState>,
    Path(short_path): Path<String>,
) -> Result<Response, AppError> {
    let path = short_path.clone();
    let url = blocking(&state, move |a| a.resolve(&path)).await?;
    let location = HeaderValue::from_str(&url).map_err(|_| {
        AppError::Unprocessable(format!("stored URL for {short_path} is not a valid redirect target"))
    })?;
    tracing::debug!(short_path = %short_path, "redirecting");
    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}

/// GET /api/links/{short_path}
pub async fn get_link(
    State(state): State<AppState>,
    Path(short_path): Path<String>,
) -> Result<Json<ShortLink>, AppError> {
    Ok(Json(blocking(&state, move |a| a.find(&short_path)).await?))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

/// GET /api/links
pub async fn list_links(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ShortLink>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    Ok(Json(blocking(&state, move |a| a.recent(limit)).await?))
}
