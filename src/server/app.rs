//! Axum application setup
//!
//! Creates and configures the Axum application with routes and middleware.

use crate::{Result, config::Settings, engine::VideoGenerator};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Retry engine shared by all requests
    pub generator: Arc<VideoGenerator>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

/// Create the main Axum application with routes and middleware
pub fn create_app(settings: Settings) -> Result<Router> {
    let generator = Arc::new(VideoGenerator::new(&settings)?);
    Ok(create_app_with_generator(generator))
}

/// Create the application around an existing generator
pub fn create_app_with_generator(generator: Arc<VideoGenerator>) -> Router {
    let state = AppState {
        generator,
        start_time: std::time::Instant::now(),
    };

    Router::new()
        .route(
            "/v1/videos/generations",
            post(super::handlers::generate_videos),
        )
        .route("/v1/models", get(super::handlers::list_models))
        .route("/ping", get(super::handlers::ping))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
