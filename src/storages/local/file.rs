//! # Local File

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, TryStreamExt};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::observability::{log_event, Event};
use crate::storages::errors::{StorageError, StorageResult};
use crate::storages::file::{ByteStream, File, DEFAULT_CONTENT_TYPE};
use crate::storages::window::ByteWindow;

/// A window over a file on the local disk.
///
/// Nothing is cached: every metadata call stats the path, so a `LocalFile`
/// always reflects the current state of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    path: PathBuf,
    window: ByteWindow,
}

impl LocalFile {
    /// A view over the whole file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            window: ByteWindow::full(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn window(&self) -> ByteWindow {
        self.window
    }

    /// A new view over `[start, end)` relative to this one
    pub fn slice(&self, start: i64, end: i64) -> StorageResult<LocalFile> {
        Ok(LocalFile {
            path: self.path.clone(),
            window: self.window.slice(start, end)?,
        })
    }

    fn locator(&self) -> String {
        self.path.display().to_string()
    }

    async fn stat(&self) -> StorageResult<std::fs::Metadata> {
        tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| StorageError::from_io(self.locator(), e))
    }
}

#[async_trait]
impl File for LocalFile {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    async fn size(&self) -> StorageResult<u64> {
        let metadata = self.stat().await?;
        Ok(self.window.len(metadata.len()))
    }

    async fn content_type(&self) -> StorageResult<String> {
        Ok(mime_guess::from_path(&self.path)
            .first_raw()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string())
    }

    async fn last_modified(&self) -> StorageResult<i64> {
        let metadata = self.stat().await?;
        let modified = metadata
            .modified()
            .map_err(|e| StorageError::from_io(self.locator(), e))?;
        Ok(DateTime::<Utc>::from(modified).timestamp_millis())
    }

    fn slice(&self, start: i64, end: i64) -> StorageResult<Box<dyn File>> {
        Ok(Box::new(LocalFile::slice(self, start, end)?))
    }

    async fn stream(&self) -> StorageResult<ByteStream> {
        let locator = self.locator();
        let mut file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| StorageError::from_io(&locator, e))?;
        let total = file
            .metadata()
            .await
            .map_err(|e| StorageError::from_io(&locator, e))?
            .len();

        // Half-open [start, end): seek to start, read exactly end - start bytes.
        let range = self.window.realize(total);
        if range.start > 0 {
            file.seek(SeekFrom::Start(range.start))
                .await
                .map_err(|e| StorageError::from_io(&locator, e))?;
        }

        let start = range.start.to_string();
        let end = range.end.to_string();
        log_event(
            Event::LocalReadOpened,
            &[("path", &locator), ("start", &start), ("end", &end)],
        );

        let reader = file.take(range.end - range.start);
        Ok(ReaderStream::new(reader)
            .map_err(move |e| StorageError::from_io(&locator, e))
            .boxed())
    }
}
