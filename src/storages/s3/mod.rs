//! # S3-Compatible Object Storage Provider
//!
//! Implements the [`File`](crate::storages::File) contract over objects in a
//! bucket, using SigV4-signed HEAD and GET requests. Object keys are flat; the
//! provider has no directory semantics.
//!
//! ```ignore
//! let client = S3Client::new(S3Config::new(endpoint, key_id, secret, "media"))?;
//! let file = client.file("videos/intro.mp4");
//! let head = file.slice(0, 1024)?.bytes().await?;
//! ```

mod client;
mod config;
mod file;
mod signer;

pub use client::{metadata_from_headers, S3Client};
pub use config::S3Config;
pub use file::S3File;
pub use signer::RequestSigner;
