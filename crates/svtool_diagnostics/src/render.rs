//! Plain-text rendering of diagnostics with `file:line:column` context.

use crate::diagnostic::Diagnostic;
use svtool_source::SourceDb;

/// Renders a diagnostic as a single human-readable line (plus notes).
///
/// Format: `error[E101]: message --> file:line:column`. Diagnostics with a
/// dummy span omit the location suffix.
pub fn render_diagnostic(diag: &Diagnostic, source_db: &SourceDb) -> String {
    let mut out = format!("{}[{}]: {}", diag.severity, diag.code, diag.message);
    if let Some(loc) = source_db.resolve(diag.primary_span) {
        out.push_str(&format!(" --> {}:{}:{}", loc.file, loc.line, loc.column));
    }
    for note in &diag.notes {
        out.push_str(&format!("\n  note: {note}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use svtool_source::Span;

    #[test]
    fn renders_with_location() {
        let mut db = SourceDb::new();
        let file = db.add_source("top.sv", "module m;\nwire @;\nendmodule\n".to_string());
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 100),
            "unrecognized character '@'",
            Span::new(file, 15, 16),
        );
        let rendered = render_diagnostic(&diag, &db);
        assert_eq!(
            rendered,
            "error[E100]: unrecognized character '@' --> top.sv:2:6"
        );
    }

    #[test]
    fn renders_without_location_for_dummy_span() {
        let db = SourceDb::new();
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 101),
            "something failed",
            Span::DUMMY,
        );
        assert_eq!(render_diagnostic(&diag, &db), "error[E101]: something failed");
    }

    #[test]
    fn renders_notes() {
        let db = SourceDb::new();
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 201),
            "unsupported construct",
            Span::DUMMY,
        )
        .with_note("replaced with a constant placeholder");
        let rendered = render_diagnostic(&diag, &db);
        assert!(rendered.contains("warning[W201]"));
        assert!(rendered.contains("note: replaced with a constant placeholder"));
    }
}
