//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/api/files` - Upload, list, delete, signed URLs and downloads
//! - `/api/storage/test` - Storage connection test
//! - `/api/health` - Health checks
//! - `/` - Static file serving (front-end build)

pub mod files;
pub mod health;
pub mod static_files;

use axum::{middleware::from_fn, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::{apply_object_policy, cors_layer};
use crate::models::AppState;

/// Create the main application router
///
/// API routes take precedence over the static front-end, which also acts
/// as the fallback for client-side routing.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);
    let static_dir = state.config.server.static_dir.clone();

    let api_router = Router::new()
        .merge(files::router(state))
        .merge(health::router());

    Router::new()
        .merge(api_router)
        .merge(static_files::router(&static_dir))
        .layer(cors)
        .layer(from_fn(apply_object_policy))
        .layer(TraceLayer::new_for_http())
}
