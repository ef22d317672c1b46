//! Non-fatal reporting sinks used while resolving comments.

use parking_lot::Mutex;
use serde::Serialize;

use crate::source::SourceLocation;

/// Receives warnings and errors produced while resolving comments.
///
/// Reporting never aborts resolution; hard failures travel through
/// [`CommentError`](crate::CommentError) instead.
pub trait Diagnostics {
    fn warn(&self, message: &str, location: Option<&SourceLocation>);
    fn error(&self, message: &str, location: Option<&SourceLocation>);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, message: &str, location: Option<&SourceLocation>) {
        match location {
            Some(location) => tracing::warn!(%location, "{message}"),
            None => tracing::warn!("{message}"),
        }
    }

    fn error(&self, message: &str, location: Option<&SourceLocation>) {
        match location {
            Some(location) => tracing::error!(%location, "{message}"),
            None => tracing::error!("{message}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// A recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

/// Thread-safe accumulator, handy for hosts that report diagnostics in bulk
/// and for tests.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, severity: Severity, message: &str, location: Option<&SourceLocation>) {
        self.diagnostics.lock().push(Diagnostic {
            severity,
            message: message.to_string(),
            location: location.cloned(),
        });
    }

    /// Snapshot of all diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.by_severity(Severity::Warning)
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.by_severity(Severity::Error)
    }

    fn by_severity(&self, severity: Severity) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.severity == severity)
            .cloned()
            .collect()
    }

    /// Takes all accumulated diagnostics, leaving the collector empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }
}

impl Diagnostics for DiagnosticCollector {
    fn warn(&self, message: &str, location: Option<&SourceLocation>) {
        self.push(Severity::Warning, message, location);
    }

    fn error(&self, message: &str, location: Option<&SourceLocation>) {
        self.push(Severity::Error, message, location);
    }
}
