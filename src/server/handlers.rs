//! HTTP request handlers
//!
//! Implementation of the OpenAI-style endpoints served by the adapter.

use crate::{
    server::app::AppState,
    types::{ErrorResponse, ModelList, PingResponse, VideoGenerationRequest, VideoGenerationResponse},
    utils::version,
};
use axum::{
    Json as RequestJson,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};

/// Video generation endpoint
///
/// POST /v1/videos/generations
///
/// Blocks until the upstream tasks finish. Dropping the request (client
/// disconnect) drops the in-flight pipeline and closes the status stream.
/// Bodies that fail to parse get the same 400 envelope as invalid requests.
#[axum_macros::debug_handler]
pub async fn generate_videos(
    State(state): State<AppState>,
    payload: Result<RequestJson<VideoGenerationRequest>, JsonRejection>,
) -> Result<Json<VideoGenerationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let RequestJson(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::invalid_request(rejection.body_text())),
        )
    })?;

    tracing::debug!(
        "Received video generation request: model={}, image={}",
        request.model,
        request.image().is_some()
    );

    match state.generator.generate(&request).await {
        Ok(response) => {
            tracing::info!(
                "Generated {} video(s) with model {}",
                response.data.len(),
                request.model
            );
            Ok(Json(response))
        }
        Err(e) => Err(error_reply(&e)),
    }
}

/// Map a pipeline error to the status code and envelope returned to callers
fn error_reply(error: &crate::Error) -> (StatusCode, Json<ErrorResponse>) {
    if error.is_client_error() {
        tracing::debug!("Rejected request: {}", error);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::invalid_request(error.to_string())),
        )
    } else {
        tracing::error!("Video generation failed: {}", error);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::request_error(error.to_string())),
        )
    }
}

/// Model list endpoint
///
/// GET /v1/models
pub async fn list_models() -> Json<ModelList> {
    Json(ModelList::video_models())
}

/// Ping endpoint for health checks
///
/// GET /ping
///
/// Returns server status, uptime and cookie pool statistics.
pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    let credentials = state.generator.pool().len();
    let cooling_down = state.generator.cooling_down().await;
    let response =
        PingResponse::new(uptime, version::get_version()).with_pool(credentials, cooling_down);

    tracing::debug!(
        "Ping response: uptime={}s, version={}, cooling_down={}/{}",
        uptime,
        version::get_version(),
        cooling_down,
        credentials
    );
    Json(response)
}
