//! # Local File Handle

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::file::LocalFile;
use super::path_name;
use crate::storages::errors::{StorageError, StorageResult};
use crate::storages::file::File;
use crate::storages::handle::{
    FileHandle, Handle, HandleKind, WritableFileStream, WritableOptions, WriteChunk,
};

/// Handle to a file on the local disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHandle {
    path: PathBuf,
}

impl LocalFileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Handle for LocalFileHandle {
    fn kind(&self) -> HandleKind {
        HandleKind::File
    }

    fn name(&self) -> String {
        path_name(&self.path)
    }

    fn locator(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileHandle for LocalFileHandle {
    fn as_handle(&self) -> &dyn Handle {
        self
    }

    async fn get_file(&self) -> StorageResult<Box<dyn File>> {
        let locator = self.path.display().to_string();
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| StorageError::from_io(&locator, e))?;
        if !metadata.is_file() {
            return Err(StorageError::TypeMismatch(locator));
        }
        Ok(Box::new(LocalFile::new(self.path.clone())))
    }

    async fn create_writable(
        &self,
        options: WritableOptions,
    ) -> StorageResult<Box<dyn WritableFileStream>> {
        Ok(Box::new(LocalWritableFileStream {
            path: self.path.clone(),
            options,
        }))
    }
}

/// Write side of a [`LocalFileHandle`].
///
/// The write path does not exist yet; every operation fails with
/// `NotImplemented` instead of pretending to succeed.
#[derive(Debug, Clone)]
pub struct LocalWritableFileStream {
    path: PathBuf,
    options: WritableOptions,
}

impl LocalWritableFileStream {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> WritableOptions {
        self.options
    }
}

#[async_trait]
impl WritableFileStream for LocalWritableFileStream {
    async fn write(&mut self, _chunk: WriteChunk) -> StorageResult<()> {
        Err(StorageError::NotImplemented("write"))
    }

    async fn seek(&mut self, _position: u64) -> StorageResult<()> {
        Err(StorageError::NotImplemented("seek"))
    }

    async fn truncate(&mut self, _size: u64) -> StorageResult<()> {
        Err(StorageError::NotImplemented("truncate"))
    }
}
