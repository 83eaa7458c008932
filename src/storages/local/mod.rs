//! # Local Filesystem Provider
//!
//! File and handle contracts over local paths. OS errors are translated into
//! [`StorageError`](crate::storages::StorageError) at this boundary.

mod directory_handle;
mod file;
mod file_handle;

use std::path::Path;

pub use directory_handle::LocalDirectoryHandle;
pub use file::LocalFile;
pub use file_handle::{LocalFileHandle, LocalWritableFileStream};

/// Last path segment, or the whole path for roots like `/`
fn path_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}
