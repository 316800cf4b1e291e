use crate::config::Config;
use crate::storage::{FileStore, HttpMethod};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: FileStore,
}

// API Request/Response types

#[derive(Debug, serde::Deserialize)]
pub struct ListFilesQuery {
    pub directory: Option<String>,
    pub max_keys: Option<usize>,
}

#[derive(Debug, serde::Deserialize)]
pub struct ObjectKeyQuery {
    pub key: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct SignedUrlQuery {
    pub key: String,
    #[serde(default)]
    pub operation: HttpMethod,
    pub expires: Option<u32>,
}

#[derive(Debug, serde::Deserialize)]
pub struct DownloadQuery {
    pub key: String,
    pub filename: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct SignedUrlResponse {
    pub url: String,
    pub object_key: String,
    pub expires: u32,
}

#[derive(Debug, serde::Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub object_key: String,
}

#[derive(Debug, serde::Serialize)]
pub struct ConnectionResponse {
    pub connected: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
