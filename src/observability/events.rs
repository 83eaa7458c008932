//! Observable storage events
//!
//! Events are explicit and typed; each one maps to a stable log name and a
//! default severity.

use std::fmt;

use super::logger::Severity;

/// Observable events in the storage layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Local filesystem
    /// A directory (and any missing ancestors) was created
    DirectoryCreated,
    /// A file or directory was removed
    EntryRemoved,
    /// A byte range of a local file was opened for reading
    LocalReadOpened,

    // Object storage
    /// Object metadata was fetched with HEAD
    MetadataFetched,
    /// A GET for an object (or a range of it) was issued
    RemoteReadStarted,
    /// A request to the object store failed
    RemoteRequestFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::DirectoryCreated => "FS_DIRECTORY_CREATED",
            Event::EntryRemoved => "FS_ENTRY_REMOVED",
            Event::LocalReadOpened => "FS_READ_OPENED",
            Event::MetadataFetched => "S3_METADATA_FETCHED",
            Event::RemoteReadStarted => "S3_READ_STARTED",
            Event::RemoteRequestFailed => "S3_REQUEST_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::LocalReadOpened | Event::RemoteReadStarted => Severity::Trace,
            Event::RemoteRequestFailed => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
