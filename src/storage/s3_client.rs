// S3-compatible gateway (Aliyun OSS, AWS S3, MinIO) backed by rust-s3

use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;
use tracing::debug;

use super::gateway::{
    GatewayError, HttpMethod, ListedObject, ObjectGateway, PutOptions, PutOutcome, SignOptions,
};
use crate::config::StorageConfig;

pub struct S3Gateway {
    bucket: Bucket,
}

impl S3Gateway {
    /// Build the bucket handle once from configuration
    pub fn new(config: &StorageConfig) -> Result<Self, GatewayError> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let credentials = Credentials::new(
            config.access_key_id.as_deref(),
            config.access_key_secret.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| GatewayError::Credentials(e.to_string()))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        debug!(bucket = %config.bucket, endpoint = %config.endpoint, "S3 bucket handle created");
        Ok(Self { bucket })
    }
}

#[async_trait]
impl ObjectGateway for S3Gateway {
    async fn put(&self, key: &str, body: Bytes, options: &PutOptions) -> Result<PutOutcome, GatewayError> {
        // extra headers live on the bucket handle, so scope them to a copy
        let mut bucket = self.bucket.clone();
        bucket.add_header("Cache-Control", &options.cache_control);

        let response = bucket
            .put_object_with_content_type(key, &body, &options.content_type)
            .await
            .map_err(|e| map_s3_error(key, e))?;

        Ok(PutOutcome {
            status: response.status_code(),
        })
    }

    async fn list(&self, prefix: &str, max_keys: usize) -> Result<Vec<ListedObject>, GatewayError> {
        let (page, _status) = self
            .bucket
            .list_page(prefix.to_string(), None, None, None, Some(max_keys))
            .await
            .map_err(|e| map_s3_error(prefix, e))?;

        Ok(page
            .contents
            .into_iter()
            .map(|object| ListedObject {
                name: object.key,
                size: object.size,
                last_modified: object.last_modified,
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<(), GatewayError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| map_s3_error(key, e))?;
        Ok(())
    }

    async fn sign_url(&self, key: &str, options: &SignOptions) -> Result<String, GatewayError> {
        let signed = match options.method {
            HttpMethod::Get => {
                let queries = options.response.signing_overrides();
                self.bucket
                    .presign_get(key, options.expires_secs, Some(queries))
                    .await
            }
            // response-* overrides only apply to GET responses
            HttpMethod::Put => self.bucket.presign_put(key, options.expires_secs, None).await,
        };
        signed.map_err(|e| map_s3_error(key, e))
    }
}

fn map_s3_error(key: &str, err: S3Error) -> GatewayError {
    match err {
        S3Error::HttpFailWithBody(404, body) => GatewayError::NotFound {
            key: key.to_string(),
            request_id: request_id_from_body(&body),
        },
        S3Error::HttpFailWithBody(status, body) => GatewayError::Rejected {
            status,
            request_id: request_id_from_body(&body),
            body,
        },
        other => GatewayError::Transport(other.to_string()),
    }
}

/// Pull `<RequestId>` out of an S3/OSS XML error body
fn request_id_from_body(body: &str) -> Option<String> {
    let start = body.find("<RequestId>")? + "<RequestId>".len();
    let end = body[start..].find("</RequestId>")? + start;
    Some(body[start..end].trim().to_string())
}
