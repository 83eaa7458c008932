//! edgedrive - file system handles over local disks and S3-compatible storage
//!
//! Backend-agnostic directory and file handles modeled on the browser File
//! System Access API, with composable byte-range reads.

pub mod observability;
pub mod storages;
