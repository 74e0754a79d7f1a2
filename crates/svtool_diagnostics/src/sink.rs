//! Thread-safe diagnostic accumulator.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A thread-safe accumulator for diagnostics emitted during a run.
///
/// The error count is tracked atomically for fast `has_errors` checks
/// without locking the diagnostic vector.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Emits a diagnostic into the sink.
    ///
    /// If the diagnostic has [`Severity::Error`], the error count is
    /// incremented atomically.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        let mut diagnostics = self.diagnostics.lock().unwrap();
        diagnostics.push(diag);
    }

    /// Returns `true` if any error-severity diagnostics have been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.lock().unwrap();
        std::mem::take(&mut *diagnostics)
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let diagnostics = self.diagnostics.lock().unwrap();
        diagnostics.clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
