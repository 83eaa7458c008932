//! S3-compatible storage configuration

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::storages::errors::{StorageError, StorageResult};

const R2_HOST_SUFFIX: &str = ".r2.cloudflarestorage.com";

/// Connection settings for an S3-compatible bucket.
///
/// Endpoint, credentials and bucket are required. Only static credentials
/// are supported.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct S3Config {
    /// Base URL of the store, e.g. `https://<account>.r2.cloudflarestorage.com`
    pub endpoint: String,

    #[serde(alias = "accessKeyId", alias = "accessKeyID")]
    pub access_key_id: String,

    #[serde(alias = "secretAccessKey")]
    pub secret_access_key: String,

    pub bucket: String,

    /// Signing region; derived from the endpoint when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl S3Config {
    pub fn new(
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            bucket: bucket.into(),
            region: None,
        }
    }

    /// Override the signing region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Check that every required field is present and the endpoint parses
    pub fn validate(&self) -> StorageResult<()> {
        let required = [
            ("endpoint", &self.endpoint),
            ("access_key_id", &self.access_key_id),
            ("secret_access_key", &self.secret_access_key),
            ("bucket", &self.bucket),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(StorageError::InvalidConfig(format!("{} is required", field)));
            }
        }
        self.endpoint_url().map(|_| ())
    }

    /// Parsed endpoint
    pub fn endpoint_url(&self) -> StorageResult<Url> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            StorageError::InvalidConfig(format!("endpoint {:?}: {}", self.endpoint, e))
        })?;
        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(url),
            _ => Err(StorageError::InvalidConfig(format!(
                "endpoint {:?} must be an http(s) URL",
                self.endpoint
            ))),
        }
    }

    /// Region used for request signing.
    ///
    /// Cloudflare R2 expects `auto`; everything else defaults to `us-east-1`.
    pub fn signing_region(&self) -> String {
        if let Some(region) = &self.region {
            return region.clone();
        }
        let is_r2 = self
            .endpoint_url()
            .ok()
            .and_then(|url| url.host_str().map(|host| host.ends_with(R2_HOST_SUFFIX)))
            .unwrap_or(false);
        if is_r2 {
            "auto".to_string()
        } else {
            "us-east-1".to_string()
        }
    }
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish()
    }
}
