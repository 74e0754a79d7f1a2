//! Structured diagnostic messages with severity, codes, and notes.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use svtool_source::Span;

/// A structured diagnostic message with a source location.
///
/// Diagnostics are the primary mechanism for reporting lexing, parsing, and
/// elaboration problems to the user. Each diagnostic carries a severity,
/// a unique code, a message, the primary source span, and optional notes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The unique code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The primary source span where the issue was detected.
    pub primary_span: Span,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given code, message, and span.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            primary_span: span,
            notes: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic with the given code, message, and span.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            primary_span: span,
            notes: Vec::new(),
        }
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}
