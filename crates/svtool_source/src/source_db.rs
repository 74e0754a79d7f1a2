//! Source database: file registration, snippet extraction, line/column lookup.

use crate::file_id::FileId;
use crate::span::Span;

/// A resolved source location for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineCol {
    /// The source file name as registered.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (byte-based).
    pub column: u32,
}

struct SourceFile {
    name: String,
    text: String,
    /// Byte offsets of the first character of every line.
    line_starts: Vec<u32>,
}

/// A database of registered source files.
///
/// Owns the source text for the whole run; AST spans and diagnostics refer
/// into it by [`FileId`] and byte offset.
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty source database.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Registers a source file and returns its ID.
    pub fn add_source(&mut self, name: impl Into<String>, text: String) -> FileId {
        let mut line_starts = vec![0u32];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile {
            name: name.into(),
            text,
            line_starts,
        });
        id
    }

    /// Returns the registered name of a file.
    pub fn file_name(&self, file: FileId) -> &str {
        &self.files[file.as_raw() as usize].name
    }

    /// Returns the full text of a file.
    pub fn file_text(&self, file: FileId) -> &str {
        &self.files[file.as_raw() as usize].text
    }

    /// Returns the source text covered by a span.
    ///
    /// Dummy spans resolve to the empty string.
    pub fn snippet(&self, span: Span) -> &str {
        if span.is_dummy() {
            return "";
        }
        let text = self.file_text(span.file);
        &text[span.start as usize..span.end as usize]
    }

    /// Resolves the start of a span to a `file:line:column` location.
    ///
    /// Returns `None` for dummy spans.
    pub fn resolve(&self, span: Span) -> Option<LineCol> {
        if span.is_dummy() {
            return None;
        }
        let file = &self.files[span.file.as_raw() as usize];
        let line_idx = match file.line_starts.binary_search(&span.start) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Some(LineCol {
            file: file.name.clone(),
            line: line_idx as u32 + 1,
            column: span.start - file.line_starts[line_idx] + 1,
        })
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup() {
        let mut db = SourceDb::new();
        let id = db.add_source("test.sv", "module m; endmodule".to_string());
        assert_eq!(db.file_name(id), "test.sv");
        assert_eq!(db.file_text(id), "module m; endmodule");
    }

    #[test]
    fn snippet_extracts_span_text() {
        let mut db = SourceDb::new();
        let id = db.add_source("test.sv", "module m; endmodule".to_string());
        let span = Span::new(id, 7, 8);
        assert_eq!(db.snippet(span), "m");
    }

    #[test]
    fn snippet_dummy_is_empty() {
        let db = SourceDb::new();
        assert_eq!(db.snippet(Span::DUMMY), "");
    }

    #[test]
    fn resolve_first_line() {
        let mut db = SourceDb::new();
        let id = db.add_source("a.sv", "wire x;\nwire y;\n".to_string());
        let loc = db.resolve(Span::new(id, 5, 6)).unwrap();
        assert_eq!(loc.file, "a.sv");
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 6);
    }

    #[test]
    fn resolve_later_line() {
        let mut db = SourceDb::new();
        let id = db.add_source("a.sv", "wire x;\nwire y;\n".to_string());
        // "wire y;" starts at offset 8
        let loc = db.resolve(Span::new(id, 13, 14)).unwrap();
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 6);
    }

    #[test]
    fn resolve_line_start() {
        let mut db = SourceDb::new();
        let id = db.add_source("a.sv", "x\ny\nz".to_string());
        let loc = db.resolve(Span::new(id, 2, 3)).unwrap();
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 1);
    }

    #[test]
    fn resolve_dummy_is_none() {
        let db = SourceDb::new();
        assert!(db.resolve(Span::DUMMY).is_none());
    }

    #[test]
    fn multiple_files() {
        let mut db = SourceDb::new();
        let a = db.add_source("a.sv", "aaa".to_string());
        let b = db.add_source("b.sv", "bbb".to_string());
        assert_eq!(db.snippet(Span::new(a, 0, 3)), "aaa");
        assert_eq!(db.snippet(Span::new(b, 0, 3)), "bbb");
    }
}
