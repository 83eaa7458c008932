//! # Byte Windows
//!
//! Every [`File`](super::file::File) is a view over a backing resource through
//! a half-open window `[start, end)`. Both providers share this type so slicing
//! composes identically everywhere.

use std::ops::Range;

use super::errors::{StorageError, StorageResult};

/// Half-open byte window over a backing resource.
///
/// `start == None` means 0 and `end == None` means the end of the resource.
/// Constructed windows always satisfy `start <= end` when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteWindow {
    start: Option<u64>,
    end: Option<u64>,
}

impl ByteWindow {
    /// The whole resource
    pub fn full() -> Self {
        Self::default()
    }

    /// A window with explicit bounds; `end` is raised to `start` if lower
    pub fn new(start: Option<u64>, end: Option<u64>) -> Self {
        let end = match (start, end) {
            (Some(s), Some(e)) => Some(e.max(s)),
            (_, end) => end,
        };
        Self { start, end }
    }

    pub fn start(&self) -> Option<u64> {
        self.start
    }

    pub fn end(&self) -> Option<u64> {
        self.end
    }

    /// Whether any bound is set
    pub fn is_set(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Compose a relative `[start, end)` slice onto this window.
    ///
    /// Over-long requests clamp instead of failing: a start past the current
    /// window yields an empty window pinned at the window's end. Open-ended
    /// windows are pinned later by [`ByteWindow::realize`].
    pub fn slice(&self, start: i64, end: i64) -> StorageResult<ByteWindow> {
        if end < 0 {
            return Err(StorageError::NotImplemented("end cannot be negative"));
        }
        if start < 0 {
            return Err(StorageError::NotImplemented("start cannot be negative"));
        }

        let base = self.start.unwrap_or(0);
        let mut absolute_start = base.saturating_add(start as u64);
        let mut absolute_end = base.saturating_add(end as u64);

        if let Some(limit) = self.end {
            absolute_end = absolute_end.min(limit);
            absolute_start = absolute_start.min(limit);
        }

        Ok(ByteWindow {
            start: Some(absolute_start),
            end: Some(absolute_end.max(absolute_start)),
        })
    }

    /// Absolute byte range of this window against a resource of `total` bytes.
    ///
    /// The result always satisfies `start <= end <= total`.
    pub fn realize(&self, total: u64) -> Range<u64> {
        let start = self.start.unwrap_or(0).min(total);
        let end = self.end.unwrap_or(total).min(total).max(start);
        start..end
    }

    /// Number of bytes visible through this window
    pub fn len(&self, total: u64) -> u64 {
        let range = self.realize(total);
        range.end - range.start
    }
}

/// `Range` header value for a realized half-open range.
///
/// HTTP ranges are inclusive, so `[start, end)` is sent as `start-(end-1)`.
/// Returns `None` for an empty range, which cannot be expressed in HTTP.
pub fn http_range_header(range: &Range<u64>) -> Option<String> {
    if range.start >= range.end {
        return None;
    }
    Some(format!("bytes={}-{}", range.start, range.end - 1))
}
