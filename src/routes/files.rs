use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use tracing::info;

use crate::middleware::ObjectPolicy;
use crate::models::{
    AppState, DeleteResponse, DownloadQuery, ListFilesQuery, ObjectKeyQuery, SignedUrlQuery,
    SignedUrlResponse, ConnectionResponse,
};
use crate::storage::{resolve_headers, FileEntry, UploadResult, UploadedFile};
use crate::types::{AppError, AppResult};

// Maximum upload size: 100MB
const MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/files", get(list_files).post(upload_file).delete(delete_file))
        .route("/api/files/signed-url", get(signed_url))
        .route("/api/files/download", get(download_file))
        .route("/api/storage/test", get(test_connection))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .with_state(state)
}

/// Browsers may send a full local path as the file name
fn base_name(raw: &str) -> &str {
    raw.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(raw)
}

async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResult>> {
    info!("File upload request received");

    let mut file: Option<UploadedFile> = None;
    let mut directory: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Invalid multipart: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let name = base_name(field.file_name().unwrap_or_default()).to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidRequest(format!("Failed to read file: {}", e)))?;
                file = Some(UploadedFile {
                    name,
                    content_type,
                    data,
                });
            }
            "directory" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidRequest(format!("Invalid directory field: {}", e)))?;
                directory = Some(text.trim().trim_matches('/').to_string());
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::InvalidRequest("No file provided".to_string()))?;
    if file.name.is_empty() {
        return Err(AppError::InvalidRequest("File name is missing".to_string()));
    }

    let result = state.store.upload_file(file, directory.as_deref()).await?;
    Ok(Json(result))
}

async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListFilesQuery>,
) -> AppResult<Json<Vec<FileEntry>>> {
    let entries = state
        .store
        .list_files(query.directory.as_deref(), query.max_keys)
        .await?;
    Ok(Json(entries))
}

async fn delete_file(
    State(state): State<AppState>,
    Query(query): Query<ObjectKeyQuery>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted = state.store.delete_file(&query.key).await?;
    Ok(Json(DeleteResponse {
        deleted,
        object_key: query.key,
    }))
}

async fn signed_url(
    State(state): State<AppState>,
    Query(query): Query<SignedUrlQuery>,
) -> AppResult<Json<SignedUrlResponse>> {
    let expires = query.expires.unwrap_or(state.store.default_expiry_secs());
    let url = state
        .store
        .get_signed_url(&query.key, query.operation, Some(expires))
        .await?;
    Ok(Json(SignedUrlResponse {
        url,
        object_key: query.key,
        expires,
    }))
}

/// Redirect the browser to a signed URL that downloads the object
async fn download_file(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> AppResult<Response> {
    let url = state
        .store
        .download_url(&query.key, query.filename.as_deref())
        .await?;

    // headers are written by the object policy layer, outside CORS
    let mut response = Redirect::temporary(&url).into_response();
    response
        .extensions_mut()
        .insert(ObjectPolicy(resolve_headers(&query.key)));
    Ok(response)
}

async fn test_connection(State(state): State<AppState>) -> AppResult<Json<ConnectionResponse>> {
    let connected = state.store.test_connection().await?;
    Ok(Json(ConnectionResponse { connected }))
}
