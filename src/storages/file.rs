//! # File Contract
//!
//! An immutable, content-bearing view over a byte window of a backing
//! resource. Providers implement [`File`]; the convenience readers are shared.

use std::fmt;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::stream::BoxStream;
use futures_util::TryStreamExt;

use super::errors::{StorageError, StorageResult};

/// Content type used when the backend cannot tell
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Single-use, lazily pulled stream of file bytes.
///
/// Dropping the stream releases the underlying descriptor or connection.
pub type ByteStream = BoxStream<'static, StorageResult<Bytes>>;

/// Size, type and modification time of a backing resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub content_type: String,
    /// Milliseconds since the Unix epoch, `0` when unknown
    pub last_modified: i64,
}

/// Fully read file contents tagged with a content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    data: Bytes,
    content_type: String,
}

impl Blob {
    pub fn new(data: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
        }
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

/// Capability set of a readable file view.
///
/// Metadata accessors may need a round trip to the backend, so they are
/// async. `slice` is pure and never touches the backend.
#[async_trait]
pub trait File: Send + Sync + fmt::Debug {
    /// Last segment of the backing locator
    fn name(&self) -> String;

    /// Number of bytes visible through this view
    async fn size(&self) -> StorageResult<u64>;

    /// MIME type of the backing resource
    async fn content_type(&self) -> StorageResult<String>;

    /// Modification time in milliseconds since the Unix epoch
    async fn last_modified(&self) -> StorageResult<i64>;

    /// A new view over `[start, end)` relative to this one
    fn slice(&self, start: i64, end: i64) -> StorageResult<Box<dyn File>>;

    /// Open a single-use stream over the bytes of this view
    async fn stream(&self) -> StorageResult<ByteStream>;

    /// Read the whole view into memory
    async fn bytes(&self) -> StorageResult<Bytes> {
        drain(self.stream().await?).await
    }

    /// Read the whole view into an owned buffer
    async fn array_buffer(&self) -> StorageResult<Vec<u8>> {
        Ok(self.bytes().await?.to_vec())
    }

    /// Read the whole view as UTF-8 text.
    ///
    /// Decoding is strict: malformed bytes fail with `InvalidData` rather
    /// than being replaced with U+FFFD as a lossy decoder would.
    async fn text(&self) -> StorageResult<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            StorageError::InvalidData(format!("{} is not valid UTF-8: {}", self.name(), e))
        })
    }

    /// Read the whole view together with its content type
    async fn blob(&self) -> StorageResult<Blob> {
        let data = self.bytes().await?;
        let content_type = self.content_type().await?;
        Ok(Blob::new(data, content_type))
    }
}

/// Collect every chunk of a stream into one buffer
pub async fn drain(mut stream: ByteStream) -> StorageResult<Bytes> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.try_next().await? {
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}
