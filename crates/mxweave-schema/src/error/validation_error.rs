//! The [`SpecValidationError`] type for wrapping normalization diagnostics.

use thiserror::Error;

use crate::error::Diagnostic;

/// Error returned when an input document cannot be normalized.
///
/// Wraps one or more diagnostics; at least one of them is an error.
#[derive(Debug, Error)]
#[error("{}", summary(.diagnostics))]
pub struct SpecValidationError {
    diagnostics: Vec<Diagnostic>,
}

impl SpecValidationError {
    /// Create a new validation error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Only the error diagnostics, without accompanying warnings.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity().is_error())
    }
}

/// The first error, followed by the count of further errors.
fn summary(diagnostics: &[Diagnostic]) -> String {
    let mut errors = diagnostics.iter().filter(|diag| diag.severity().is_error());
    let Some(first) = errors.next() else {
        return String::new();
    };
    match errors.count() {
        0 => first.to_string(),
        rest => format!("{first} (+{rest} more)"),
    }
}

impl From<Diagnostic> for SpecValidationError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for SpecValidationError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}
