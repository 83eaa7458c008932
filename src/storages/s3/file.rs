//! # S3 File

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::sync::OnceCell;

use super::client::S3Client;
use crate::storages::errors::StorageResult;
use crate::storages::file::{ByteStream, File, FileMetadata};
use crate::storages::window::{http_range_header, ByteWindow};

/// A window over an object in an S3-compatible bucket.
///
/// Metadata is fetched with a single HEAD the first time it is needed and
/// kept in a cell shared with every slice of this file. It is never
/// refreshed.
#[derive(Debug, Clone)]
pub struct S3File {
    object_key: String,
    client: S3Client,
    window: ByteWindow,
    metadata: Arc<OnceCell<FileMetadata>>,
}

impl S3File {
    pub fn new(object_key: impl Into<String>, client: S3Client) -> Self {
        Self {
            object_key: object_key.into(),
            client,
            window: ByteWindow::full(),
            metadata: Arc::new(OnceCell::new()),
        }
    }

    /// A file whose metadata is already known; no HEAD will be issued
    pub fn with_metadata(
        object_key: impl Into<String>,
        client: S3Client,
        metadata: FileMetadata,
    ) -> Self {
        Self {
            metadata: Arc::new(OnceCell::new_with(Some(metadata))),
            ..Self::new(object_key, client)
        }
    }

    pub fn object_key(&self) -> &str {
        &self.object_key
    }

    pub fn window(&self) -> ByteWindow {
        self.window
    }

    /// Metadata of the whole object, fetched at most once per lineage
    pub async fn metadata(&self) -> StorageResult<&FileMetadata> {
        self.metadata
            .get_or_try_init(|| self.client.head_object(&self.object_key))
            .await
    }

    /// A new view over `[start, end)` relative to this one, sharing metadata
    pub fn slice(&self, start: i64, end: i64) -> StorageResult<S3File> {
        Ok(S3File {
            object_key: self.object_key.clone(),
            client: self.client.clone(),
            window: self.window.slice(start, end)?,
            metadata: Arc::clone(&self.metadata),
        })
    }
}

#[async_trait]
impl File for S3File {
    fn name(&self) -> String {
        self.object_key
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    async fn size(&self) -> StorageResult<u64> {
        let metadata = self.metadata().await?;
        Ok(self.window.len(metadata.size))
    }

    async fn content_type(&self) -> StorageResult<String> {
        Ok(self.metadata().await?.content_type.clone())
    }

    async fn last_modified(&self) -> StorageResult<i64> {
        Ok(self.metadata().await?.last_modified)
    }

    fn slice(&self, start: i64, end: i64) -> StorageResult<Box<dyn File>> {
        Ok(Box::new(S3File::slice(self, start, end)?))
    }

    async fn stream(&self) -> StorageResult<ByteStream> {
        let range = match (self.window.start(), self.window.end()) {
            (None, None) => return self.client.get_object(&self.object_key, None).await,
            // Both bounds known: the store clamps the end itself.
            (Some(start), Some(end)) => start..end,
            _ => {
                let metadata = self.metadata().await?;
                self.window.realize(metadata.size)
            }
        };

        match http_range_header(&range) {
            Some(header) => self.client.get_object(&self.object_key, Some(header)).await,
            None => Ok(stream::empty().boxed()),
        }
    }
}
