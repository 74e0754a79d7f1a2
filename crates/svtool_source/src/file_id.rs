//! Opaque identifiers for source files.

use serde::{Deserialize, Serialize};

/// An opaque, copyable identifier for a source file in a [`SourceDb`](crate::SourceDb).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// A sentinel file ID used by [`Span::DUMMY`](crate::Span::DUMMY).
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}
