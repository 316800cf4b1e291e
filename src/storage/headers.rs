//! Response header policy for signed access URLs
//!
//! Given a storage key, decides how the browser should treat the object when
//! it is fetched through a signed URL: content type, inline vs. attachment,
//! caching, plus the fixed CORS and CSP entries the front-end relies on for
//! embedding previews.

use serde::Serialize;
use std::collections::HashMap;

use super::category::{extension_of, file_name_of};

pub const CACHE_ONE_YEAR: &str = "public, max-age=31536000";
pub const CACHE_NONE: &str = "no-cache";
pub const OCTET_STREAM: &str = "application/octet-stream";

const CORS_ALLOW_ORIGIN: &str = "*";
const CORS_ALLOW_METHODS: &str = "GET, HEAD, OPTIONS";
const CORS_EXPOSE_HEADERS: &str = "ETag, Content-Length";
const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data: blob:; media-src 'self' data: blob:";

/// How a stored object is presented to the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Pdf,
    Office,
    Image,
    Video,
    Markdown,
    PlainText,
    Binary,
}

/// Extension → kind lookup, consulted in one place
const KIND_TABLE: &[(&str, ContentKind)] = &[
    ("pdf", ContentKind::Pdf),
    ("doc", ContentKind::Office),
    ("docx", ContentKind::Office),
    ("xls", ContentKind::Office),
    ("xlsx", ContentKind::Office),
    ("ppt", ContentKind::Office),
    ("pptx", ContentKind::Office),
    ("jpg", ContentKind::Image),
    ("jpeg", ContentKind::Image),
    ("png", ContentKind::Image),
    ("gif", ContentKind::Image),
    ("svg", ContentKind::Image),
    ("webp", ContentKind::Image),
    ("mp4", ContentKind::Video),
    ("webm", ContentKind::Video),
    ("ogg", ContentKind::Video),
    ("md", ContentKind::Markdown),
    ("markdown", ContentKind::Markdown),
    ("txt", ContentKind::PlainText),
];

impl ContentKind {
    pub fn from_extension(ext: &str) -> Self {
        KIND_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map(|(_, kind)| *kind)
            .unwrap_or(ContentKind::Binary)
    }

    /// MIME type for an object of this kind with the given lowercased extension
    pub fn content_type(&self, ext: &str) -> String {
        match self {
            ContentKind::Pdf => "application/pdf".to_string(),
            ContentKind::Office | ContentKind::Binary => OCTET_STREAM.to_string(),
            ContentKind::Image => match ext {
                "jpg" => "image/jpeg".to_string(),
                "svg" => "image/svg+xml".to_string(),
                _ => format!("image/{}", ext),
            },
            ContentKind::Video => format!("video/{}", ext),
            ContentKind::Markdown => "text/markdown".to_string(),
            ContentKind::PlainText => "text/plain".to_string(),
        }
    }

    pub fn cache_control(&self) -> &'static str {
        match self {
            ContentKind::Image | ContentKind::Video => CACHE_ONE_YEAR,
            _ => CACHE_NONE,
        }
    }

    /// Documents are served with their file name so viewers can label them
    fn names_file(&self) -> bool {
        matches!(self, ContentKind::Pdf | ContentKind::Office)
    }
}

/// Headers to attach to a signed URL request for one object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseHeaderSet {
    pub content_type: String,
    pub content_disposition: String,
    pub cache_control: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    pub access_control_allow_origin: &'static str,
    pub access_control_allow_methods: &'static str,
    pub access_control_expose_headers: &'static str,
    pub content_security_policy: &'static str,
}

impl ResponseHeaderSet {
    /// Replace the disposition so the browser saves instead of rendering
    pub fn into_attachment(mut self, file_name: &str) -> Self {
        self.content_disposition = format!(
            "attachment; filename=\"{}\"",
            urlencoding::encode(file_name)
        );
        self
    }

    /// Entries the object store can override on the response through the
    /// signed URL's query string
    pub fn signing_overrides(&self) -> HashMap<String, String> {
        let mut queries = HashMap::new();
        queries.insert("response-content-type".to_string(), self.content_type.clone());
        queries.insert(
            "response-content-disposition".to_string(),
            self.content_disposition.clone(),
        );
        queries.insert("response-cache-control".to_string(), self.cache_control.clone());
        if let Some(encoding) = &self.content_encoding {
            queries.insert("response-content-encoding".to_string(), encoding.clone());
        }
        queries
    }

    /// Cross-origin and embedding policy entries, as HTTP header pairs
    pub fn policy_headers(&self) -> [(&'static str, &'static str); 4] {
        [
            ("access-control-allow-origin", self.access_control_allow_origin),
            ("access-control-allow-methods", self.access_control_allow_methods),
            ("access-control-expose-headers", self.access_control_expose_headers),
            ("content-security-policy", self.content_security_policy),
        ]
    }
}

/// Derive the response headers for a storage key from its extension
pub fn resolve_headers(storage_key: &str) -> ResponseHeaderSet {
    let ext = extension_of(storage_key);
    let kind = ContentKind::from_extension(&ext);

    let content_disposition = if kind.names_file() {
        format!(
            "inline; filename=\"{}\"",
            urlencoding::encode(file_name_of(storage_key))
        )
    } else {
        "inline".to_string()
    };

    let content_encoding = kind.names_file().then(|| "identity".to_string());

    ResponseHeaderSet {
        content_type: kind.content_type(&ext),
        content_disposition,
        cache_control: kind.cache_control().to_string(),
        content_encoding,
        access_control_allow_origin: CORS_ALLOW_ORIGIN,
        access_control_allow_methods: CORS_ALLOW_METHODS,
        access_control_expose_headers: CORS_EXPOSE_HEADERS,
        content_security_policy: CONTENT_SECURITY_POLICY,
    }
}
