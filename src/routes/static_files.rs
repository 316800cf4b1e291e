//! Static File Serving
//!
//! Serves the front-end bundle (`dist/` with hashed files under `assets/`)
//! so the upload/browse UI and this API share one origin.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::path::{Path, PathBuf};
use tower_http::services::ServeDir;
use tracing::{info, warn};

/// Create router for serving the front-end build output
pub fn router(static_dir: &str) -> Router {
    let static_dir = PathBuf::from(static_dir);
    if static_dir.is_dir() {
        info!(path = %static_dir.display(), "Serving front-end build");
    } else {
        warn!(path = %static_dir.display(), "Front-end build directory not found, serving API only");
    }

    let index_path = static_dir.join("index.html");
    let serve_dir = ServeDir::new(&static_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/", get(move || serve_index(index_path.clone())))
        .nest_service("/assets", ServeDir::new(static_dir.join("assets")))
        .fallback_service(serve_dir)
}

async fn serve_index(index_path: PathBuf) -> impl IntoResponse {
    match tokio::fs::read_to_string(&index_path).await {
        Ok(content) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            content,
        )
            .into_response(),
        Err(_) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            fallback_page(&index_path),
        )
            .into_response(),
    }
}

fn fallback_page(index_path: &Path) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>VQA Storage - API Server</title>
</head>
<body>
    <h1>VQA Storage</h1>
    <p>The API is running, but no front-end build was found at <code>{}</code>.</p>
    <ul>
        <li><code>GET /api/health</code> - Health check</li>
        <li><code>GET /api/files</code> - List files</li>
        <li><code>POST /api/files</code> - Upload a file (multipart)</li>
        <li><code>GET /api/files/signed-url?key=...</code> - Signed URL</li>
        <li><code>GET /api/storage/test</code> - Storage connection test</li>
    </ul>
</body>
</html>"#,
        index_path.display()
    )
}
