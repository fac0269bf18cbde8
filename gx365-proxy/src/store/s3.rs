//! S3-backed `ObjectStore`.
//!
//! Works against any S3-compatible endpoint (R2, B2, MinIO...).

use std::time::Duration;

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::Client;
use aws_types::region::Region;

use super::{ByteRange, ObjectStore, StoreError, StoredObject};
use crate::config::StorageConfig;

pub struct S3Store {
    client: Client,
    bucket: String,
    key_prefix: String,
}

impl S3Store {
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "gx365-proxy-config",
        );

        let timeouts = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(config.timeout_secs))
            .build();

        let mut builder = aws_sdk_s3::config::Builder::new()
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .timeout_config(timeouts)
            .behavior_version_latest();

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint.trim_end_matches('/'));
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            key_prefix: config.key_prefix.clone(),
        }
    }

    fn prefixed_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&self.key_prefix);

            if let Some(token) = continuation_token.take() {
                req = req.continuation_token(token);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| classify("list_objects", &self.key_prefix, e))?;

            for obj in resp.contents() {
                if let Some(key) = obj.key() {
                    // Strip the key_prefix so callers see the keys clients ask for.
                    if let Some(relative) = key.strip_prefix(&self.key_prefix) {
                        keys.push(relative.to_string());
                    }
                }
            }

            if resp.is_truncated() == Some(true) {
                continuation_token = resp.next_continuation_token().map(|s| s.to_string());
                if continuation_token.is_none() {
                    return Err(StoreError::Storage(
                        "truncated listing without continuation token".to_string(),
                    ));
                }
            } else {
                break;
            }
        }

        Ok(keys)
    }

    async fn get(
        &self,
        key: &str,
        range: Option<ByteRange>,
    ) -> Result<Option<StoredObject>, StoreError> {
        let mut req = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.prefixed_key(key));

        if let Some(range) = range {
            req = req.range(range.header_value());
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) if status_of(&e) == Some(404) => return Ok(None),
            Err(e) if status_of(&e) == Some(416) => {
                return Err(StoreError::InvalidRange(key.to_string()))
            }
            Err(e) => return Err(classify("get_object", key, e)),
        };

        let content_type = resp.content_type().map(str::to_string);
        let etag = resp.e_tag().map(str::to_string);
        let content_range = resp.content_range().map(str::to_string);

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Storage(format!("read body {key}: {e}")))?
            .into_bytes()
            .to_vec();

        Ok(Some(StoredObject {
            body,
            content_type,
            etag,
            content_range,
        }))
    }
}

fn status_of<E>(err: &SdkError<E>) -> Option<u16> {
    match err {
        SdkError::ServiceError(e) => Some(e.raw().status().as_u16()),
        _ => None,
    }
}

fn classify<E: std::fmt::Display>(op: &str, key: &str, err: SdkError<E>) -> StoreError {
    match err {
        SdkError::TimeoutError(_) => StoreError::Timeout(format!("{op} {key}")),
        other => StoreError::Storage(format!("{op} {key}: {other}")),
    }
}
