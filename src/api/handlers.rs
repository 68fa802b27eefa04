use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{AudioResponse, CreateAudioRequest, HealthResponse, MessageResponse};
use crate::api::routes::AppState;
use crate::catalog::{LanguageOption, RequestOrigin};
use crate::error::AppError;
use crate::store::DeleteOutcome;

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Audio Catalog API is running".to_string(),
    })
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.catalog.mode(),
    })
}

pub async fn list_languages(State(state): State<Arc<AppState>>) -> Json<Vec<LanguageOption>> {
    Json(state.catalog.list_languages().to_vec())
}

pub async fn get_audio(
    State(state): State<Arc<AppState>>,
    origin: RequestOrigin,
    Path(language): Path<String>,
) -> Result<Json<AudioResponse>, AppError> {
    let record = state.catalog.get_by_language(&language).await?;
    Ok(Json(AudioResponse::from_record(record, &origin)))
}

pub async fn list_audio(
    State(state): State<Arc<AppState>>,
    origin: RequestOrigin,
) -> Result<Json<Vec<AudioResponse>>, AppError> {
    let records = state.catalog.list_all().await?;
    Ok(Json(
        records
            .into_iter()
            .map(|record| AudioResponse::from_record(record, &origin))
            .collect(),
    ))
}

pub async fn create_audio(
    State(state): State<Arc<AppState>>,
    origin: RequestOrigin,
    Json(request): Json<CreateAudioRequest>,
) -> Result<(StatusCode, Json<AudioResponse>), AppError> {
    let record = state
        .catalog
        .create(&request.language, &request.text, &request.filename)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AudioResponse::from_record(record, &origin)),
    ))
}

pub async fn delete_audio(
    State(state): State<Arc<AppState>>,
    Path(audio_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = match state.catalog.delete(&audio_id).await? {
        DeleteOutcome::Primary => "Audio file deleted successfully",
        DeleteOutcome::Fallback => "Audio file deleted successfully (in-memory mode)",
    };
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}
