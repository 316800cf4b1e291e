use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    /// Front-end build output served at `/`
    pub static_dir: String,
}

#[derive(Clone)]
pub struct StorageConfig {
    /// `oss`/`s3` for an S3-compatible bucket, `memory` for an in-process store
    pub provider: String,
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    pub access_key_id: Option<String>,
    pub access_key_secret: Option<String>,
    pub path_style: bool,
    pub signed_url_expiry_secs: u32,
    pub list_max_keys: usize,
}

impl StorageConfig {
    /// Access key id reduced to `abc***xyz` for log output
    pub fn masked_access_key_id(&self) -> String {
        match &self.access_key_id {
            Some(id) if id.chars().count() > 6 => {
                let chars: Vec<char> = id.chars().collect();
                let head: String = chars[..3].iter().collect();
                let tail: String = chars[chars.len() - 3..].iter().collect();
                format!("{}***{}", head, tail)
            }
            Some(_) => "***".to_string(),
            None => "<unset>".to_string(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.access_key_id.as_deref().is_some_and(|id| !id.is_empty())
            && self.access_key_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

// Secrets stay out of Debug output
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("provider", &self.provider)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.masked_access_key_id())
            .field("path_style", &self.path_style)
            .field("signed_url_expiry_secs", &self.signed_url_expiry_secs)
            .field("list_max_keys", &self.list_max_keys)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let region = env::var("STORAGE_REGION").unwrap_or_else(|_| "oss-cn-nanjing".to_string());

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("PORT must be a port number")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "dist".to_string()),
            },
            storage: StorageConfig {
                provider: env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "oss".to_string()),
                bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "vqaplatform".to_string()),
                endpoint: env::var("STORAGE_ENDPOINT")
                    .unwrap_or_else(|_| format!("https://{}.aliyuncs.com", region)),
                region,
                access_key_id: env::var("STORAGE_ACCESS_KEY_ID").ok(),
                access_key_secret: env::var("STORAGE_ACCESS_KEY_SECRET").ok(),
                path_style: env::var("STORAGE_PATH_STYLE")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .context("STORAGE_PATH_STYLE must be true or false")?,
                signed_url_expiry_secs: env::var("SIGNED_URL_EXPIRY_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .context("SIGNED_URL_EXPIRY_SECS must be a number of seconds")?,
                list_max_keys: env::var("LIST_MAX_KEYS")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()
                    .context("LIST_MAX_KEYS must be a positive integer")?,
            },
        })
    }
}
