use super::error::{ApiError, ApiResult};
use super::extract::RequiredQuery;
use super::state::AppState;
use crate::egress::{EgressJob, EgressStopResult, EgressSummary, RecordingMode};
use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeFile;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartEgressParams {
    pub user_id: String,
    pub room_name: String,
    /// Record audio only (OGG) instead of audio+video (MP4)
    #[serde(default)]
    pub audio_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct StopEgressParams {
    pub egress_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListEgressParams {
    pub room_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListFilesParams {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FileUrlParams {
    pub file_key: String,
    /// Signed URL lifetime in seconds
    pub expiration: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StartEgressResponse {
    pub message: String,
    pub info: EgressJob,
}

#[derive(Debug, Serialize)]
pub struct StopEgressResponse {
    pub message: String,
    pub info: EgressStopResult,
}

#[derive(Debug, Serialize)]
pub struct EgressListResponse<T> {
    pub egresses: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct RecordingsResponse {
    pub recordings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FileUrlResponse {
    pub url: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the Jarvis Backend API".to_string(),
    })
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// POST /egress/start
/// Start a composite recording of a room for a user
pub async fn start_egress(
    State(state): State<AppState>,
    RequiredQuery(params): RequiredQuery<StartEgressParams>,
) -> ApiResult<Json<StartEgressResponse>> {
    let mode = RecordingMode::from_audio_only(params.audio_only);

    info!(
        "Starting egress for room {} (user={}, mode={:?})",
        params.room_name, params.user_id, mode
    );

    let job = state
        .egress
        .start(&params.room_name, &params.user_id, mode)
        .await
        .map_err(|e| {
            error!("Failed to start egress: {}", e.detail());
            ApiError::from(e)
        })?;

    Ok(Json(StartEgressResponse {
        message: format!("Egress started for user {}", params.user_id),
        info: job,
    }))
}

/// POST /egress/stop
/// Stop an egress by id
pub async fn stop_egress(
    State(state): State<AppState>,
    RequiredQuery(params): RequiredQuery<StopEgressParams>,
) -> ApiResult<Json<StopEgressResponse>> {
    info!("Stopping egress {}", params.egress_id);

    let result = state.egress.stop(&params.egress_id).await.map_err(|e| {
        error!("Failed to stop egress: {}", e.detail());
        ApiError::from(e)
    })?;

    Ok(Json(StopEgressResponse {
        message: format!("Egress {} stopped", params.egress_id),
        info: result,
    }))
}

/// GET /egress/list
/// Egresses known to the media server (active and finished)
pub async fn list_egresses(
    State(state): State<AppState>,
    RequiredQuery(params): RequiredQuery<ListEgressParams>,
) -> ApiResult<Json<EgressListResponse<EgressSummary>>> {
    let egresses = state
        .egress
        .list(params.room_name.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to list egresses: {}", e.detail());
            ApiError::from(e)
        })?;

    Ok(Json(EgressListResponse { egresses }))
}

/// GET /egress/active
/// Egresses started by this process and not yet stopped
pub async fn active_egresses(State(state): State<AppState>) -> Json<EgressListResponse<EgressJob>> {
    Json(EgressListResponse {
        egresses: state.egress.active_jobs().await,
    })
}

/// GET /list
/// Recording keys stored for a user
pub async fn list_files(
    State(state): State<AppState>,
    RequiredQuery(params): RequiredQuery<ListFilesParams>,
) -> ApiResult<Json<RecordingsResponse>> {
    let recordings = state.storage.list_files(&params.user_id).await.map_err(|e| {
        error!("Failed to list files: {}", e.detail());
        ApiError::from(e)
    })?;

    Ok(Json(RecordingsResponse { recordings }))
}

/// GET /get_file_url
/// Signed, time-limited download URL for a recording key
pub async fn get_file_url(
    State(state): State<AppState>,
    RequiredQuery(params): RequiredQuery<FileUrlParams>,
) -> ApiResult<Json<FileUrlResponse>> {
    let url = state
        .storage
        .get_file_url(&params.file_key, params.expiration)
        .map_err(|e| {
            error!("Failed to generate file URL: {}", e.detail());
            ApiError::from(e)
        })?;

    Ok(Json(FileUrlResponse { url }))
}

/// GET /recordings
/// Files in the local recordings directory
pub async fn list_local_recordings(
    State(state): State<AppState>,
) -> ApiResult<Json<RecordingsResponse>> {
    let recordings = state.recordings.list().await?;
    Ok(Json(RecordingsResponse { recordings }))
}

/// GET /recordings/:recording_id
/// Download a local recording (streamed from disk)
pub async fn get_local_recording(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let Some(path) = state.recordings.locate(&recording_id).await? else {
        return Err(ApiError::not_found("Recording not found"));
    };

    let mut response = ServeFile::new(&path)
        .try_call(request)
        .await
        .map_err(|e| {
            error!("Failed to serve {:?}: {}", path, e);
            ApiError::internal(format!("Failed to read recording: {}", e))
        })?
        .into_response();

    if response.status().is_success() {
        if let Ok(value) =
            HeaderValue::from_str(&format!("attachment; filename=\"{}\"", recording_id))
        {
            response
                .headers_mut()
                .insert(header::CONTENT_DISPOSITION, value);
        }
    }

    Ok(response)
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
