//! # Storage Providers
//!
//! One contract for hierarchical, file-like resources, whether they live on
//! the local disk or in an S3-compatible bucket.
//!
//! A caller holds a [`DirectoryHandle`], walks down with
//! `get_directory_handle` / `get_file_handle`, turns a [`FileHandle`] into an
//! immutable [`File`] and reads byte ranges through `slice` and `stream`.

pub mod errors;
pub mod file;
pub mod handle;
pub mod local;
pub mod s3;
pub mod window;

pub use errors::{StorageError, StorageResult};
pub use file::{Blob, ByteStream, File, FileMetadata};
pub use handle::{
    DirectoryHandle, Entry, EntryStream, FileHandle, GetHandleOptions, Handle, HandleKind,
    RemoveOptions, WritableFileStream, WritableMode, WritableOptions, WriteChunk,
};
pub use local::{LocalDirectoryHandle, LocalFile, LocalFileHandle};
pub use s3::{S3Client, S3Config, S3File};
pub use window::ByteWindow;
