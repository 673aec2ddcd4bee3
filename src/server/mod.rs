//! HTTP server
//!
//! Axum router, shared state and request handlers.

pub mod app;
pub mod handlers;

pub use app::{AppState, create_app, create_app_with_generator};
