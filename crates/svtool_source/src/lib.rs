//! Source text management for the svtool toolchain.
//!
//! Tracks source files, byte-offset spans, and resolves spans back to
//! `file:line:column` locations for diagnostics.

#![warn(missing_docs)]

pub mod file_id;
pub mod source_db;
pub mod span;

pub use file_id::FileId;
pub use source_db::{LineCol, SourceDb};
pub use span::Span;
