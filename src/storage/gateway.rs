use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::headers::ResponseHeaderSet;

/// Failures reported by the object store, kept as close to the provider's
/// own response as possible
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Object not found: {key}")]
    NotFound {
        key: String,
        request_id: Option<String>,
    },

    #[error("Storage request rejected with status {status}: {body}")]
    Rejected {
        status: u16,
        body: String,
        request_id: Option<String>,
    },

    #[error("Unexpected storage response status {0}")]
    UnexpectedStatus(u16),

    #[error("Storage credentials error: {0}")]
    Credentials(String),

    #[error("Storage transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Short code for log lines
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::NotFound { .. } => "NoSuchKey",
            GatewayError::Rejected { status: 401 | 403, .. } => "AccessDenied",
            GatewayError::Rejected { .. } => "Rejected",
            GatewayError::UnexpectedStatus(_) => "UnexpectedStatus",
            GatewayError::Credentials(_) => "InvalidCredentials",
            GatewayError::Transport(_) => "Transport",
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            GatewayError::NotFound { request_id, .. }
            | GatewayError::Rejected { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }
}

/// HTTP method a signed URL is minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[default]
    Get,
    Put,
}

impl HttpMethod {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "put" => Some(HttpMethod::Put),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Put => write!(f, "PUT"),
        }
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::from_id(s).ok_or_else(|| format!("unsupported operation: {}", s))
    }
}

/// Request headers sent along with an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: String,
    pub cache_control: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutOutcome {
    pub status: u16,
}

/// One object as reported by a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedObject {
    pub name: String,
    pub size: u64,
    pub last_modified: String,
}

/// Options merged into a signing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOptions {
    pub method: HttpMethod,
    pub expires_secs: u32,
    pub response: ResponseHeaderSet,
}

/// Object storage operations consumed by the file store.
///
/// Implementations perform exactly one provider round-trip per call and
/// return provider failures untouched.
#[async_trait]
pub trait ObjectGateway: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, options: &PutOptions) -> Result<PutOutcome, GatewayError>;

    async fn list(&self, prefix: &str, max_keys: usize) -> Result<Vec<ListedObject>, GatewayError>;

    async fn delete(&self, key: &str) -> Result<(), GatewayError>;

    async fn sign_url(&self, key: &str, options: &SignOptions) -> Result<String, GatewayError>;
}
