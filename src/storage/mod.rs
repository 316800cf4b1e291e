//! Object storage layer
//!
//! - `category` / `headers`: pure key classification and response policy
//! - `gateway`: the provider-facing trait, with `s3_client` (OSS/S3/MinIO)
//!   and `memory` implementations
//! - `FileStore`: the operations the front-end uses, one gateway handle
//!   shared across all of them

pub mod category;
pub mod gateway;
pub mod headers;
pub mod memory;
pub mod s3_client;

pub use category::{category_segment, extension_of, file_name_of, normalize_key, FileCategory};
pub use gateway::{
    GatewayError, HttpMethod, ListedObject, ObjectGateway, PutOptions, PutOutcome, SignOptions,
};
pub use headers::{resolve_headers, ContentKind, ResponseHeaderSet};
pub use memory::MemoryGateway;
pub use s3_client::S3Gateway;

use bytes::Bytes;
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::StorageConfig;
use crate::types::{AppError, AppResult};

pub const DEFAULT_EXPIRY_SECS: u32 = 3600;
pub const DEFAULT_MAX_KEYS: usize = 100;

/// Rewrite a plain-http URL to https, leaving everything else untouched
pub fn force_https(url: String) -> String {
    // scheme comparison is case-insensitive
    if url.get(..7).is_some_and(|scheme| scheme.eq_ignore_ascii_case("http://")) {
        format!("https://{}", &url[7..])
    } else {
        url
    }
}

async fn sign_with(
    gateway: &dyn ObjectGateway,
    storage_key: &str,
    options: SignOptions,
) -> Result<String, GatewayError> {
    let url = gateway.sign_url(storage_key, &options).await?;
    Ok(force_https(url))
}

/// Mint a time-limited URL for one object with its response policy applied.
///
/// The returned URL always uses https.
pub async fn mint_access_url(
    gateway: &dyn ObjectGateway,
    storage_key: &str,
    method: HttpMethod,
    expiry_secs: u32,
) -> Result<String, GatewayError> {
    let options = SignOptions {
        method,
        expires_secs: expiry_secs,
        response: resolve_headers(storage_key),
    };
    sign_with(gateway, storage_key, options).await
}

/// A file handed over by the caller for upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Base name of the file, without any local directories
    pub name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    pub url: String,
    pub object_key: String,
    pub name: String,
    pub size: u64,
    pub category: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub url: String,
    pub object_key: String,
    pub size: u64,
    pub last_modified: String,
    pub category: String,
}

fn log_gateway_failure(operation: &str, key: &str, err: &GatewayError) {
    error!(
        operation,
        key,
        code = err.code(),
        request_id = err.request_id().unwrap_or("-"),
        error = %err,
        "Storage operation failed"
    );
}

/// Upload/list/delete/sign operations over a single long-lived gateway
#[derive(Clone)]
pub struct FileStore {
    gateway: Arc<dyn ObjectGateway>,
    default_expiry_secs: u32,
    default_max_keys: usize,
    access_key_hint: String,
}

impl FileStore {
    pub fn new(gateway: Arc<dyn ObjectGateway>) -> Self {
        Self {
            gateway,
            default_expiry_secs: DEFAULT_EXPIRY_SECS,
            default_max_keys: DEFAULT_MAX_KEYS,
            access_key_hint: "<unset>".to_string(),
        }
    }

    /// Build the gateway selected by `provider` and wrap it
    pub fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let gateway: Arc<dyn ObjectGateway> = match config.provider.as_str() {
            "oss" | "s3" | "minio" => {
                if !config.has_credentials() {
                    warn!("Storage credentials are not set, requests will rely on the SDK's credential chain");
                }
                Arc::new(S3Gateway::new(config).map_err(|e| AppError::Configuration(e.to_string()))?)
            }
            "memory" => Arc::new(MemoryGateway::new(format!(
                "{}/{}",
                config.endpoint.trim_end_matches('/'),
                config.bucket
            ))),
            other => {
                return Err(AppError::Configuration(format!(
                    "Unsupported storage provider: {}",
                    other
                )))
            }
        };

        info!(
            provider = %config.provider,
            bucket = %config.bucket,
            region = %config.region,
            "Storage gateway initialized"
        );

        Ok(Self {
            gateway,
            default_expiry_secs: config.signed_url_expiry_secs,
            default_max_keys: config.list_max_keys,
            access_key_hint: config.masked_access_key_id(),
        })
    }

    pub fn default_expiry_secs(&self) -> u32 {
        self.default_expiry_secs
    }

    /// Signed URL for an object; a leading `/` on the key is ignored
    pub async fn get_signed_url(
        &self,
        object_key: &str,
        operation: HttpMethod,
        expiry_secs: Option<u32>,
    ) -> AppResult<String> {
        let key = object_key.strip_prefix('/').unwrap_or(object_key);
        let expiry_secs = expiry_secs.unwrap_or(self.default_expiry_secs);

        match mint_access_url(self.gateway.as_ref(), key, operation, expiry_secs).await {
            Ok(url) => {
                info!(key, %operation, expiry_secs, "Signed URL generated");
                Ok(url)
            }
            Err(e) => {
                log_gateway_failure("sign", key, &e);
                Err(e.into())
            }
        }
    }

    /// Store a file under its canonical key and return a readable URL for it
    pub async fn upload_file(&self, file: UploadedFile, directory: Option<&str>) -> AppResult<UploadResult> {
        let object_key = normalize_key(&file.name, directory);
        let size = file.data.len() as u64;
        let options = PutOptions {
            content_type: file
                .content_type
                .filter(|ct| !ct.is_empty())
                .unwrap_or_else(|| resolve_headers(&object_key).content_type),
            cache_control: headers::CACHE_NONE.to_string(),
        };

        info!(
            name = %file.name,
            key = %object_key,
            content_type = %options.content_type,
            size,
            "Uploading file"
        );

        let outcome = self
            .gateway
            .put(&object_key, file.data, &options)
            .await
            .map_err(|e| {
                log_gateway_failure("put", &object_key, &e);
                e
            })?;

        if outcome.status != 200 {
            let err = GatewayError::UnexpectedStatus(outcome.status);
            log_gateway_failure("put", &object_key, &err);
            return Err(err.into());
        }

        let url = self
            .get_signed_url(&object_key, HttpMethod::Get, None)
            .await?;

        info!(key = %object_key, "Upload complete");
        Ok(UploadResult {
            url,
            category: category_segment(&object_key).to_string(),
            object_key,
            name: file.name,
            size,
            status: "success".to_string(),
        })
    }

    /// List objects under a directory, or under every category when none is
    /// given. Category listings run concurrently and come back in category
    /// order.
    pub async fn list_files(&self, directory: Option<&str>, max_keys: Option<usize>) -> AppResult<Vec<FileEntry>> {
        let max_keys = max_keys.unwrap_or(self.default_max_keys);

        // keys never start with '/', so "/" or "" means no directory
        let directory = directory
            .map(|d| d.trim().trim_matches('/'))
            .filter(|d| !d.is_empty());
        let prefixes: Vec<String> = match directory {
            Some(dir) => vec![format!("{}/", dir)],
            None => FileCategory::ALL.iter().map(FileCategory::prefix).collect(),
        };

        let listings = try_join_all(prefixes.iter().map(|prefix| async move {
            self.gateway.list(prefix, max_keys).await.map_err(|e| {
                log_gateway_failure("list", prefix, &e);
                e
            })
        }))
        .await?;

        let objects: Vec<ListedObject> = listings.into_iter().flatten().collect();
        let entries = try_join_all(objects.into_iter().map(|object| async move {
            let url = self
                .get_signed_url(&object.name, HttpMethod::Get, None)
                .await?;
            Ok::<_, AppError>(FileEntry {
                name: file_name_of(&object.name).to_string(),
                url,
                category: category_segment(&object.name).to_string(),
                object_key: object.name,
                size: object.size,
                last_modified: object.last_modified,
            })
        }))
        .await?;

        info!(prefixes = ?prefixes, count = entries.len(), "Listed files");
        Ok(entries)
    }

    pub async fn delete_file(&self, object_key: &str) -> AppResult<bool> {
        match self.gateway.delete(object_key).await {
            Ok(()) => {
                info!(key = object_key, "File deleted");
                Ok(true)
            }
            Err(e) => {
                log_gateway_failure("delete", object_key, &e);
                Err(e.into())
            }
        }
    }

    /// Signed GET URL that makes the browser save the object as `file_name`
    /// (defaults to the key's last segment) instead of rendering it
    pub async fn download_url(&self, object_key: &str, file_name: Option<&str>) -> AppResult<String> {
        let key = object_key.strip_prefix('/').unwrap_or(object_key);
        let file_name = file_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| file_name_of(key));

        let options = SignOptions {
            method: HttpMethod::Get,
            expires_secs: self.default_expiry_secs,
            response: resolve_headers(key).into_attachment(file_name),
        };

        sign_with(self.gateway.as_ref(), key, options)
            .await
            .map_err(|e| {
                log_gateway_failure("download", key, &e);
                e.into()
            })
    }

    /// Cheapest authenticated round-trip: list at most one object
    pub async fn test_connection(&self) -> AppResult<bool> {
        info!(access_key_id = %self.access_key_hint, "Testing storage connection");

        match self.gateway.list("", 1).await {
            Ok(objects) => {
                info!(sample = objects.len(), "Storage connection OK");
                Ok(true)
            }
            Err(e) => {
                log_gateway_failure("test_connection", "", &e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    /// Wraps the memory gateway, recording list prefixes and optionally
    /// overriding the put status
    struct RecordingGateway {
        inner: MemoryGateway,
        listed: Mutex<Vec<String>>,
        put_status: u16,
    }

    impl RecordingGateway {
        fn new() -> Self {
            Self {
                inner: MemoryGateway::new("http://bucket.test"),
                listed: Mutex::new(Vec::new()),
                put_status: 200,
            }
        }
    }

    #[async_trait]
    impl ObjectGateway for RecordingGateway {
        async fn put(&self, key: &str, body: Bytes, options: &PutOptions) -> Result<PutOutcome, GatewayError> {
            self.inner.put(key, body, options).await?;
            Ok(PutOutcome { status: self.put_status })
        }

        async fn list(&self, prefix: &str, max_keys: usize) -> Result<Vec<ListedObject>, GatewayError> {
            self.listed.lock().unwrap().push(prefix.to_string());
            self.inner.list(prefix, max_keys).await
        }

        async fn delete(&self, key: &str) -> Result<(), GatewayError> {
            self.inner.delete(key).await
        }

        async fn sign_url(&self, key: &str, options: &SignOptions) -> Result<String, GatewayError> {
            self.inner.sign_url(key, options).await
        }
    }

    fn file(name: &str, content_type: Option<&str>) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            content_type: content_type.map(str::to_string),
            data: Bytes::from_static(b"hello"),
        }
    }

    #[tokio::test]
    async fn test_mint_access_url_forces_https() {
        let gateway = MemoryGateway::new("http://bucket.test");
        let url = mint_access_url(&gateway, "paper/report.pdf", HttpMethod::Get, 600)
            .await
            .unwrap();
        assert!(url.starts_with("https://bucket.test/paper/report.pdf?"));
        assert!(url.contains("X-Expires=600"));
        assert!(url.contains("response-content-disposition=inline%3B%20filename%3D%22report.pdf%22"));
    }

    #[test]
    fn test_force_https() {
        assert_eq!(force_https("http://a/b".to_string()), "https://a/b");
        assert_eq!(force_https("https://a/b".to_string()), "https://a/b");
        assert_eq!(force_https("HTTP://a/b".to_string()), "https://a/b");
        assert_eq!(force_https("Http://a/b".to_string()), "https://a/b");
        assert_eq!(force_https("ftp://a".to_string()), "ftp://a");
        assert_eq!(force_https("http:".to_string()), "http:");
    }

    #[tokio::test]
    async fn test_upload_classifies_and_signs() {
        let gateway = MemoryGateway::new("http://bucket.test");
        let store = FileStore::new(Arc::new(gateway.clone()));

        let result = store.upload_file(file("report.pdf", None), None).await.unwrap();
        assert_eq!(result.object_key, "paper/report.pdf");
        assert_eq!(result.category, "paper");
        assert_eq!(result.size, 5);
        assert_eq!(result.status, "success");
        assert!(result.url.starts_with("https://"));

        let (_, content_type) = gateway.get("paper/report.pdf").await.unwrap();
        assert_eq!(content_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_upload_prefers_client_content_type_and_directory() {
        let gateway = MemoryGateway::new("http://bucket.test");
        let store = FileStore::new(Arc::new(gateway.clone()));

        let result = store
            .upload_file(file("photo.PNG", Some("image/x-custom")), Some("uploads"))
            .await
            .unwrap();
        assert_eq!(result.object_key, "uploads/photo.PNG");
        assert_eq!(result.category, "uploads");

        let (_, content_type) = gateway.get("uploads/photo.PNG").await.unwrap();
        assert_eq!(content_type, "image/x-custom");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_200_status() {
        let mut gateway = RecordingGateway::new();
        gateway.put_status = 203;
        let store = FileStore::new(Arc::new(gateway));

        let err = store.upload_file(file("a.txt", None), None).await.unwrap_err();
        assert!(matches!(err, AppError::Gateway(GatewayError::UnexpectedStatus(203))));
    }

    #[tokio::test]
    async fn test_list_without_directory_queries_each_category() {
        let gateway = Arc::new(RecordingGateway::new());
        let store = FileStore::new(gateway.clone());

        for name in ["clip.mp4", "report.pdf", "main.py", "photo.png", "data.bin"] {
            assert_ok!(store.upload_file(file(name, None), None).await);
        }

        let entries = store.list_files(None, None).await.unwrap();

        let mut listed = gateway.listed.lock().unwrap().clone();
        listed.sort();
        assert_eq!(listed, vec!["code/", "note/", "other/", "paper/", "video/"]);

        let keys: Vec<_> = entries.iter().map(|e| e.object_key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["paper/report.pdf", "code/main.py", "note/photo.png", "video/clip.mp4", "other/data.bin"]
        );
        for entry in &entries {
            assert_eq!(entry.category, entry.object_key.split('/').next().unwrap());
            assert_eq!(entry.name, entry.object_key.rsplit('/').next().unwrap());
            assert!(entry.url.starts_with("https://"));
        }
    }

    #[tokio::test]
    async fn test_list_with_directory_uses_single_prefix() {
        let gateway = Arc::new(RecordingGateway::new());
        let store = FileStore::new(gateway.clone());
        assert_ok!(store.upload_file(file("a.txt", None), Some("uploads")).await);
        assert_ok!(store.upload_file(file("b.txt", None), Some("uploads2")).await);

        let entries = store.list_files(Some("uploads"), Some(10)).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].object_key, "uploads/a.txt");
        assert_eq!(*gateway.listed.lock().unwrap(), vec!["uploads/".to_string()]);
    }

    #[tokio::test]
    async fn test_list_with_slash_only_directory_lists_categories() {
        let gateway = Arc::new(RecordingGateway::new());
        let store = FileStore::new(gateway.clone());
        assert_ok!(store.upload_file(file("report.pdf", None), None).await);

        let entries = store.list_files(Some("/"), None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].object_key, "paper/report.pdf");

        let mut listed = gateway.listed.lock().unwrap().clone();
        listed.sort();
        assert_eq!(listed, vec!["code/", "note/", "other/", "paper/", "video/"]);
    }

    #[tokio::test]
    async fn test_list_trims_surrounding_slashes() {
        let gateway = Arc::new(RecordingGateway::new());
        let store = FileStore::new(gateway.clone());
        assert_ok!(store.upload_file(file("a.txt", None), Some("uploads")).await);

        let entries = store.list_files(Some("/uploads/"), None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(*gateway.listed.lock().unwrap(), vec!["uploads/".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_missing_surfaces_not_found() {
        let store = FileStore::new(Arc::new(MemoryGateway::new("http://bucket.test")));
        let err = store.delete_file("paper/missing.pdf").await.unwrap_err();
        match err {
            AppError::Gateway(GatewayError::NotFound { key, .. }) => assert_eq!(key, "paper/missing.pdf"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_existing() {
        let store = FileStore::new(Arc::new(MemoryGateway::new("http://bucket.test")));
        assert_ok!(store.upload_file(file("a.txt", None), None).await);
        assert!(store.delete_file("other/a.txt").await.unwrap());
        assert_err!(store.delete_file("other/a.txt").await);
    }

    #[tokio::test]
    async fn test_signed_url_strips_leading_slash() {
        let store = FileStore::new(Arc::new(MemoryGateway::new("http://bucket.test")));
        let url = store
            .get_signed_url("/note/a.png", HttpMethod::Put, Some(120))
            .await
            .unwrap();
        assert!(url.starts_with("https://bucket.test/note/a.png?X-Method=PUT&X-Expires=120"));
    }

    #[tokio::test]
    async fn test_download_url_uses_attachment() {
        let store = FileStore::new(Arc::new(MemoryGateway::new("http://bucket.test")));
        let url = store.download_url("paper/report.pdf", Some("final.pdf")).await.unwrap();
        assert!(url.contains("response-content-disposition=attachment%3B%20filename%3D%22final.pdf%22"));

        let url = store.download_url("note/a.png", None).await.unwrap();
        assert!(url.contains("filename%3D%22a.png%22"));
    }

    #[tokio::test]
    async fn test_connection_lists_one_object() {
        let gateway = Arc::new(RecordingGateway::new());
        let store = FileStore::new(gateway.clone());
        assert!(store.test_connection().await.unwrap());
        assert_eq!(*gateway.listed.lock().unwrap(), vec![String::new()]);
    }

    #[test]
    fn test_from_config_rejects_unknown_provider() {
        let config = StorageConfig {
            provider: "ftp".to_string(),
            bucket: "vqaplatform".to_string(),
            region: "oss-cn-nanjing".to_string(),
            endpoint: "https://oss-cn-nanjing.aliyuncs.com".to_string(),
            access_key_id: None,
            access_key_secret: None,
            path_style: false,
            signed_url_expiry_secs: 3600,
            list_max_keys: 100,
        };
        assert!(matches!(FileStore::from_config(&config), Err(AppError::Configuration(_))));
    }
}
