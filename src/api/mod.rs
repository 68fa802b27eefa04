pub mod handlers;
pub mod routes;

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use serde::{Deserialize, Serialize};

use crate::catalog::{audio_url, RequestOrigin};
use crate::store::{AudioRecord, StoreMode};
use routes::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAudioRequest {
    pub language: String,
    pub text: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct AudioResponse {
    pub id: String,
    pub language: String,
    pub text: String,
    pub audio_url: String,
    pub filename: String,
}

impl AudioResponse {
    pub fn from_record(record: AudioRecord, origin: &RequestOrigin) -> Self {
        Self {
            audio_url: audio_url(origin, &record.filename),
            id: record.id,
            language: record.language,
            text: record.text,
            filename: record.filename,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: StoreMode,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(origin_from_parts(parts, &state.config.public_host))
    }
}

/// Scheme from `X-Forwarded-Proto`, host from `Host`, then the request URI,
/// then `default_host`.
fn origin_from_parts(parts: &Parts, default_host: &str) -> RequestOrigin {
    let scheme = parts
        .headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| parts.uri.scheme_str().map(String::from))
        .unwrap_or_else(|| "http".to_string());

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| default_host.to_string());

    RequestOrigin::new(scheme, host)
}
