//! # Handle Contracts
//!
//! Lightweight references to named entries in a hierarchical namespace,
//! modeled on the browser `FileSystemHandle` family. A handle does not imply
//! that its entry exists; existence is checked by the operations.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};

use super::errors::{StorageError, StorageResult};
use super::file::File;

/// Kind of entry a handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    File,
    Directory,
}

impl HandleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleKind::File => "file",
            HandleKind::Directory => "directory",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity shared by file and directory handles: (kind, name, locator)
pub trait Handle: Send + Sync + fmt::Debug {
    fn kind(&self) -> HandleKind;

    /// Last segment of the locator
    fn name(&self) -> String;

    /// Backing locator of the entry
    fn locator(&self) -> &Path;

    /// Whether both handles refer to the same entry
    fn is_same_entry(&self, other: &dyn Handle) -> bool {
        self.kind() == other.kind() && self.locator() == other.locator()
    }
}

/// Options for `get_directory_handle` / `get_file_handle`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetHandleOptions {
    /// Create the entry when it is missing
    pub create: bool,
}

impl GetHandleOptions {
    pub fn create() -> Self {
        Self { create: true }
    }
}

/// Options for `remove_entry`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Remove a directory together with everything below it
    pub recursive: bool,
}

impl RemoveOptions {
    pub fn recursive() -> Self {
        Self { recursive: true }
    }
}

/// Locking mode requested for a writable stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritableMode {
    Exclusive,
    #[default]
    Siloed,
}

/// Options for `create_writable`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WritableOptions {
    pub keep_existing_data: bool,
    pub mode: WritableMode,
}

/// One write-path instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteChunk {
    Bytes(Bytes),
    Text(String),
    Write { position: Option<u64>, data: Bytes },
    Seek { position: u64 },
    Truncate { size: u64 },
}

/// Write side of a file handle
#[async_trait]
pub trait WritableFileStream: Send + Sync + fmt::Debug {
    async fn write(&mut self, chunk: WriteChunk) -> StorageResult<()>;
    async fn seek(&mut self, position: u64) -> StorageResult<()>;
    async fn truncate(&mut self, size: u64) -> StorageResult<()>;
}

/// Handle to a file entry
#[async_trait]
pub trait FileHandle: Handle {
    fn as_handle(&self) -> &dyn Handle;

    /// Snapshot the entry as a readable [`File`]
    async fn get_file(&self) -> StorageResult<Box<dyn File>>;

    async fn create_writable(
        &self,
        options: WritableOptions,
    ) -> StorageResult<Box<dyn WritableFileStream>>;
}

/// A direct child of a directory
#[derive(Debug)]
pub enum Entry {
    File(Box<dyn FileHandle>),
    Directory(Box<dyn DirectoryHandle>),
}

impl Entry {
    pub fn kind(&self) -> HandleKind {
        match self {
            Entry::File(_) => HandleKind::File,
            Entry::Directory(_) => HandleKind::Directory,
        }
    }

    pub fn name(&self) -> String {
        self.as_handle().name()
    }

    pub fn as_handle(&self) -> &dyn Handle {
        match self {
            Entry::File(handle) => handle.as_handle(),
            Entry::Directory(handle) => handle.as_handle(),
        }
    }

    pub fn into_file(self) -> StorageResult<Box<dyn FileHandle>> {
        match self {
            Entry::File(handle) => Ok(handle),
            Entry::Directory(handle) => Err(StorageError::TypeMismatch(
                handle.locator().display().to_string(),
            )),
        }
    }

    pub fn into_directory(self) -> StorageResult<Box<dyn DirectoryHandle>> {
        match self {
            Entry::Directory(handle) => Ok(handle),
            Entry::File(handle) => Err(StorageError::TypeMismatch(
                handle.locator().display().to_string(),
            )),
        }
    }
}

/// Lazy listing of `(name, entry)` pairs
pub type EntryStream = BoxStream<'static, StorageResult<(String, Entry)>>;

/// Handle to a directory entry.
///
/// Listings are produced fresh from the backing store on every call. They
/// cover direct children only, in no particular order, and cannot be
/// restarted once polled.
#[async_trait]
pub trait DirectoryHandle: Handle {
    fn as_handle(&self) -> &dyn Handle;

    async fn get_directory_handle(
        &self,
        name: &str,
        options: GetHandleOptions,
    ) -> StorageResult<Box<dyn DirectoryHandle>>;

    async fn get_file_handle(
        &self,
        name: &str,
        options: GetHandleOptions,
    ) -> StorageResult<Box<dyn FileHandle>>;

    async fn remove_entry(&self, name: &str, options: RemoveOptions) -> StorageResult<()>;

    /// Path segments from this directory down to `possible_descendant`, or
    /// `None` when it does not lie strictly inside this directory
    fn resolve(&self, possible_descendant: &dyn Handle) -> Option<Vec<String>>;

    fn entries(&self) -> EntryStream;

    fn keys(&self) -> BoxStream<'static, StorageResult<String>> {
        self.entries().map_ok(|(name, _)| name).boxed()
    }

    fn values(&self) -> BoxStream<'static, StorageResult<Entry>> {
        self.entries().map_ok(|(_, entry)| entry).boxed()
    }
}

/// Reject names that would address anything but a direct child
pub fn validate_entry_name(name: &str) -> StorageResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}
