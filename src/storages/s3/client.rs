//! # S3 Client
//!
//! Thin signed-request layer shared by every [`S3File`] of one bucket.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED, RANGE,
};
use reqwest::{Method, Response, StatusCode};
use url::Url;

use super::config::S3Config;
use super::file::S3File;
use super::signer::{uri_encode, RequestSigner};
use crate::observability::{log_event, Event};
use crate::storages::errors::{StorageError, StorageResult};
use crate::storages::file::{ByteStream, FileMetadata, DEFAULT_CONTENT_TYPE};

/// Signed HTTP access to one bucket.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct S3Client {
    config: Arc<S3Config>,
    endpoint: Url,
    http: reqwest::Client,
    signer: RequestSigner,
}

impl S3Client {
    pub fn new(config: S3Config) -> StorageResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StorageError::Internal(format!("http client: {}", e)))?;
        Self::with_http_client(config, http)
    }

    /// Use a preconfigured `reqwest` client (proxies, TLS roots, timeouts)
    pub fn with_http_client(config: S3Config, http: reqwest::Client) -> StorageResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;
        let signer = RequestSigner::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            config.signing_region(),
        );
        Ok(Self {
            config: Arc::new(config),
            endpoint,
            http,
            signer,
        })
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// A file over the whole object at `object_key`
    pub fn file(&self, object_key: impl Into<String>) -> S3File {
        S3File::new(object_key, self.clone())
    }

    /// `{endpoint}/{bucket}/{object_key}` with each segment URI-encoded.
    ///
    /// Keys with `.` or `..` segments are rejected: URL normalization would
    /// otherwise move the request outside the bucket.
    pub fn object_url(&self, object_key: &str) -> StorageResult<Url> {
        if object_key
            .split('/')
            .any(|segment| segment == "." || segment == "..")
        {
            return Err(StorageError::InvalidName(object_key.to_string()));
        }

        let mut url = self.endpoint.clone();
        let path = format!(
            "{}/{}/{}",
            self.endpoint.path().trim_end_matches('/'),
            uri_encode(&self.config.bucket, true),
            uri_encode(object_key, false),
        );
        url.set_path(&path);
        url.set_query(None);
        Ok(url)
    }

    /// HEAD the object and read its metadata from the response headers
    pub async fn head_object(&self, object_key: &str) -> StorageResult<FileMetadata> {
        let response = self.send(Method::HEAD, object_key, None).await?;
        let metadata = metadata_from_headers(response.headers());

        let size = metadata.size.to_string();
        log_event(
            Event::MetadataFetched,
            &[("key", object_key), ("size", &size)],
        );
        Ok(metadata)
    }

    /// GET the object, or the inclusive `range` header value when given.
    ///
    /// A range starting past the end of the object yields an empty stream.
    pub async fn get_object(
        &self,
        object_key: &str,
        range: Option<String>,
    ) -> StorageResult<ByteStream> {
        log_event(
            Event::RemoteReadStarted,
            &[("key", object_key), ("range", range.as_deref().unwrap_or("*"))],
        );
        let response = self.send(Method::GET, object_key, range).await?;
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(stream::empty().boxed());
        }

        let key = object_key.to_string();
        Ok(response
            .bytes_stream()
            .map_err(move |e| StorageError::Http {
                key: key.clone(),
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })
            .boxed())
    }

    async fn send(
        &self,
        method: Method,
        object_key: &str,
        range: Option<String>,
    ) -> StorageResult<Response> {
        let url = self.object_url(object_key)?;

        let ranged = range.is_some();
        let mut headers = HeaderMap::new();
        if let Some(range) = range {
            let value = HeaderValue::from_str(&range)
                .map_err(|e| StorageError::Internal(format!("range header: {}", e)))?;
            headers.insert(RANGE, value);
        }
        self.signer.sign(&method, &url, &mut headers, Utc::now())?;

        let response = self
            .http
            .request(method.clone(), url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                let message = e.to_string();
                log_event(
                    Event::RemoteRequestFailed,
                    &[("key", object_key), ("method", method.as_str()), ("error", &message)],
                );
                StorageError::Http {
                    key: object_key.to_string(),
                    status: None,
                    message,
                }
            })?;

        let status = response.status();
        let unsatisfiable = ranged && status == StatusCode::RANGE_NOT_SATISFIABLE;
        if !status.is_success() && !unsatisfiable {
            // Dropping the response aborts the connection instead of draining it.
            drop(response);
            let code = status.as_u16().to_string();
            log_event(
                Event::RemoteRequestFailed,
                &[("key", object_key), ("method", method.as_str()), ("status", &code)],
            );
            return Err(StorageError::from_status(
                object_key,
                status.as_u16(),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        Ok(response)
    }
}

/// Read size, type and modification time from HEAD response headers
pub fn metadata_from_headers(headers: &HeaderMap) -> FileMetadata {
    let size = header_str(headers, CONTENT_LENGTH)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let content_type = header_str(headers, CONTENT_TYPE)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();
    let last_modified = header_str(headers, LAST_MODIFIED)
        .and_then(|v| DateTime::parse_from_rfc2822(v.trim()).ok())
        .map(|date| date.timestamp_millis())
        .unwrap_or(0);

    FileMetadata {
        size,
        content_type,
        last_modified,
    }
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
