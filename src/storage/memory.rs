//! In-process gateway for local development and tests
//!
//! Selected with `STORAGE_PROVIDER=memory`. Objects vanish with the process
//! and the "signatures" it mints are not verifiable; everything else
//! (prefix listing, not-found on delete, response overrides in the query
//! string) behaves like a real bucket.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::gateway::{
    GatewayError, HttpMethod, ListedObject, ObjectGateway, PutOptions, PutOutcome, SignOptions,
};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
    last_modified: String,
}

#[derive(Clone, Default)]
pub struct MemoryGateway {
    base_url: String,
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl MemoryGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Arc::default(),
        }
    }

    /// Stored bytes and content type for a key
    pub async fn get(&self, key: &str) -> Option<(Bytes, String)> {
        let guard = self.objects.read().await;
        guard
            .get(key)
            .map(|object| (object.body.clone(), object.content_type.clone()))
    }
}

/// ISO-8601 UTC, the shape S3 reports in `LastModified`
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl ObjectGateway for MemoryGateway {
    async fn put(&self, key: &str, body: Bytes, options: &PutOptions) -> Result<PutOutcome, GatewayError> {
        let mut guard = self.objects.write().await;
        guard.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: options.content_type.clone(),
                last_modified: now_timestamp(),
            },
        );
        Ok(PutOutcome { status: 200 })
    }

    async fn list(&self, prefix: &str, max_keys: usize) -> Result<Vec<ListedObject>, GatewayError> {
        let guard = self.objects.read().await;
        Ok(guard
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .take(max_keys)
            .map(|(key, object)| ListedObject {
                name: key.clone(),
                size: object.body.len() as u64,
                last_modified: object.last_modified.clone(),
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<(), GatewayError> {
        let mut guard = self.objects.write().await;
        match guard.remove(key) {
            Some(_) => Ok(()),
            None => Err(GatewayError::NotFound {
                key: key.to_string(),
                request_id: None,
            }),
        }
    }

    async fn sign_url(&self, key: &str, options: &SignOptions) -> Result<String, GatewayError> {
        let mut overrides: Vec<(String, String)> = match options.method {
            HttpMethod::Get => options.response.signing_overrides().into_iter().collect(),
            HttpMethod::Put => Vec::new(),
        };
        overrides.sort();

        let mut url = format!(
            "{}/{}?X-Method={}&X-Expires={}",
            self.base_url,
            urlencoding::encode(key).replace("%2F", "/"),
            options.method,
            options.expires_secs
        );
        for (name, value) in overrides {
            url.push('&');
            url.push_str(&name);
            url.push('=');
            url.push_str(&urlencoding::encode(&value));
        }
        Ok(url)
    }
}
