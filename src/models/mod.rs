use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shortener::AllocationError;

/// Prefix under which short paths are served by the web layer.
pub const REDIRECT_PREFIX: &str = "/go/";

/// Validate a URL submitted for shortening.
///
/// Only the empty string is rejected. No scheme or format check is done, so
/// anything else (including strings that are not URLs at all) is accepted.
pub fn validate_original_url(url: &str) -> Result<(), AllocationError> {
    if url.is_empty() {
        Err(AllocationError::InvalidInput)
    } else {
        Ok(())
    }
}

/// Relative URL a short path is reachable at.
pub fn short_url(short_path: &str) -> String {
    format!("{REDIRECT_PREFIX}{short_path}")
}

/// A stored short path → URL mapping. Never updated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: i64,
    pub short_path: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /shorten`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    #[serde(default)]
    pub original_url: Option<String>,
}

/// Reply to a successful `POST /shorten`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub id: i64,
    pub short_path: String,
    pub short_url: String,
}

impl From<&ShortLink> for ShortenResponse {
    fn from(link: &ShortLink) -> Self {
        ShortenResponse {
            id: link.id,
            short_path: link.short_path.clone(),
            short_url: short_url(&link.short_path),
        }
    }
}
