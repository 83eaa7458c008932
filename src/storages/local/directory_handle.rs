//! # Local Directory Handle

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use tokio::fs::ReadDir;

use super::file_handle::LocalFileHandle;
use super::path_name;
use crate::observability::{log_event, Event};
use crate::storages::errors::{StorageError, StorageResult};
use crate::storages::handle::{
    validate_entry_name, DirectoryHandle, Entry, EntryStream, FileHandle, GetHandleOptions,
    Handle, HandleKind, RemoveOptions,
};

/// Handle to a directory on the local disk.
///
/// Children are looked up on demand; the handle caches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDirectoryHandle {
    path: PathBuf,
}

impl LocalDirectoryHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn child_path(&self, name: &str) -> StorageResult<PathBuf> {
        validate_entry_name(name)?;
        Ok(self.path.join(name))
    }

    /// Stat a child, mapping "missing" to `None`
    async fn stat_child(path: &Path) -> StorageResult<Option<std::fs::Metadata>> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_io(path.display().to_string(), e)),
        }
    }
}

impl Handle for LocalDirectoryHandle {
    fn kind(&self) -> HandleKind {
        HandleKind::Directory
    }

    fn name(&self) -> String {
        path_name(&self.path)
    }

    fn locator(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DirectoryHandle for LocalDirectoryHandle {
    fn as_handle(&self) -> &dyn Handle {
        self
    }

    async fn get_directory_handle(
        &self,
        name: &str,
        options: GetHandleOptions,
    ) -> StorageResult<Box<dyn DirectoryHandle>> {
        let path = self.child_path(name)?;
        let locator = path.display().to_string();

        match Self::stat_child(&path).await? {
            Some(metadata) if metadata.is_dir() => {}
            Some(_) => return Err(StorageError::TypeMismatch(locator)),
            None if options.create => {
                tokio::fs::create_dir_all(&path)
                    .await
                    .map_err(|e| StorageError::from_io(&locator, e))?;
                log_event(Event::DirectoryCreated, &[("path", &locator)]);
            }
            None => return Err(StorageError::NotFound(locator)),
        }

        Ok(Box::new(LocalDirectoryHandle::new(path)))
    }

    async fn get_file_handle(
        &self,
        name: &str,
        options: GetHandleOptions,
    ) -> StorageResult<Box<dyn FileHandle>> {
        let path = self.child_path(name)?;
        let locator = path.display().to_string();

        // `create` only hands out a handle; the write path materializes the file.
        match Self::stat_child(&path).await? {
            Some(metadata) if metadata.is_file() => {}
            Some(_) => return Err(StorageError::TypeMismatch(locator)),
            None if options.create => {}
            None => return Err(StorageError::NotFound(locator)),
        }

        Ok(Box::new(LocalFileHandle::new(path)))
    }

    async fn remove_entry(&self, name: &str, options: RemoveOptions) -> StorageResult<()> {
        let path = self.child_path(name)?;
        let locator = path.display().to_string();

        let metadata = tokio::fs::symlink_metadata(&path)
            .await
            .map_err(|e| StorageError::from_io(&locator, e))?;

        let removed = if !metadata.is_dir() {
            tokio::fs::remove_file(&path).await
        } else if options.recursive {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_dir(&path).await
        };
        removed.map_err(|e| StorageError::from_io(&locator, e))?;

        let recursive = options.recursive.to_string();
        log_event(
            Event::EntryRemoved,
            &[("path", &locator), ("recursive", &recursive)],
        );
        Ok(())
    }

    fn resolve(&self, possible_descendant: &dyn Handle) -> Option<Vec<String>> {
        // Component-wise: "/a/bc" is not below "/a/b".
        let relative = possible_descendant.locator().strip_prefix(&self.path).ok()?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    segments.push(segment.to_string_lossy().into_owned())
                }
                Component::CurDir => {}
                _ => return None,
            }
        }

        if segments.is_empty() {
            return None;
        }
        Some(segments)
    }

    fn entries(&self) -> EntryStream {
        let dir = self.path.clone();
        let locator = dir.display().to_string();

        stream::once(async move {
            tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| StorageError::from_io(&locator, e))
                .map(|read_dir| stream::try_unfold((read_dir, locator), next_entry))
        })
        .try_flatten()
        .boxed()
    }
}

/// Pull the next file or directory out of a listing, skipping other kinds
async fn next_entry(
    (mut read_dir, locator): (ReadDir, String),
) -> StorageResult<Option<((String, Entry), (ReadDir, String))>> {
    loop {
        let dir_entry = match read_dir.next_entry().await {
            Ok(Some(dir_entry)) => dir_entry,
            Ok(None) => return Ok(None),
            Err(e) => return Err(StorageError::from_io(&locator, e)),
        };

        let file_type = dir_entry
            .file_type()
            .await
            .map_err(|e| StorageError::from_io(&locator, e))?;
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        let path = dir_entry.path();

        let entry = if file_type.is_dir() {
            Entry::Directory(Box::new(LocalDirectoryHandle::new(path)))
        } else if file_type.is_file() {
            Entry::File(Box::new(LocalFileHandle::new(path)))
        } else {
            continue;
        };

        return Ok(Some(((name, entry), (read_dir, locator))));
    }
}
