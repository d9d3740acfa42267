//! Error adapter for converting MxweaveError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! When a [`SpecValidationError`](mxweave::SpecValidationError) contains
//! multiple diagnostics, each diagnostic is rendered independently.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use mxweave::MxweaveError;
use mxweave_schema::error::{Diagnostic, Location};

use crate::span;

/// Adapter for a single schema diagnostic.
///
/// Label locations are JSON pointers; they are mapped to byte spans of the
/// input text when the text allows it.
pub struct DiagnosticAdapter<'a> {
    /// The wrapped diagnostic
    diag: &'a Diagnostic,
    /// Input text for displaying snippets
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }

    fn span(&self, location: &Location) -> Option<SourceSpan> {
        span::locate(self.src, location.as_str())
            .map(|range| SourceSpan::new(range.start.into(), range.len()))
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        if self.diag.severity().is_error() {
            Some(miette::Severity::Error)
        } else {
            Some(miette::Severity::Warning)
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels: Vec<LabeledSpan> = self
            .diag
            .labels()
            .iter()
            .filter_map(|label| {
                let span = self.span(label.location())?;
                let message = Some(format!("{} ({})", label.message(), label.location()));
                Some(if label.is_primary() {
                    LabeledSpan::new_primary_with_span(message, span)
                } else {
                    LabeledSpan::new_with_span(message, span)
                })
            })
            .collect();

        if labels.is_empty() {
            return None;
        }
        Some(Box::new(labels.into_iter()))
    }
}

/// Adapter for non-diagnostic [`MxweaveError`] variants.
///
/// This adapter handles errors that don't have rich diagnostic information,
/// such as I/O errors, style table errors, layout errors, and export errors.
pub struct ErrorAdapter<'a>(pub &'a MxweaveError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            MxweaveError::Io(_) => "mxweave::io",
            MxweaveError::Validation { .. } => return None,
            MxweaveError::StyleTable(_) => "mxweave::style_table",
            MxweaveError::Layout(_) => "mxweave::layout",
            MxweaveError::Export(_) => "mxweave::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            MxweaveError::StyleTable(_) => Some(Box::new(
                "a style table is a JSON object mapping style keys to draw.io style strings",
            ) as Box<dyn fmt::Display>),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
///
/// This enum wraps either a single diagnostic or a non-diagnostic error,
/// providing a uniform interface for error rendering.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`MxweaveError`] into a list of reportable errors.
///
/// For [`MxweaveError::Validation`], this returns one [`Reportable`] for
/// each diagnostic in the error, warnings included. For other error variants,
/// this returns a single [`Reportable`].
pub fn to_reportables(err: &MxweaveError) -> Vec<Reportable<'_>> {
    match err {
        MxweaveError::Validation { err, src } => err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use mxweave::SpecValidationError;
    use mxweave_schema::error::ErrorCode;

    use super::*;

    const SOURCE: &str = r#"{"nodes": [{"id": "a"}, {"id": "a"}], "edges": []}"#;

    #[test]
    fn test_single_diagnostic() {
        let diag = Diagnostic::error("test error")
            .with_code(ErrorCode::E203)
            .with_label(Location::root().field("edges"), "here")
            .with_help("try this");
        let err = MxweaveError::new_validation_error(SpecValidationError::from(diag), SOURCE);

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert_eq!(d.to_string(), "test error");
                assert_eq!(d.code().unwrap().to_string(), "E203");
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_multiple_diagnostics() {
        let diags = vec![
            Diagnostic::error("first error").with_code(ErrorCode::E201),
            Diagnostic::warning("a warning"),
            Diagnostic::error("second error").with_code(ErrorCode::E203),
        ];
        let err = MxweaveError::new_validation_error(SpecValidationError::from(diags), SOURCE);

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 3);
        assert_eq!(reportables[0].to_string(), "first error");
        assert_eq!(reportables[1].severity(), Some(miette::Severity::Warning));
        assert_eq!(reportables[2].to_string(), "second error");
    }

    #[test]
    fn test_non_validation_error() {
        let err = MxweaveError::Layout("cycle survived".to_string());

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Layout error: cycle survived");
                assert_eq!(e.code().unwrap().to_string(), "mxweave::layout");
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_labels_map_pointers_to_spans() {
        let nodes = Location::root().field("nodes");
        let diag = Diagnostic::error("duplicate node id")
            .with_label(nodes.index(1).field("id"), "duplicate definition")
            .with_secondary_label(nodes.index(0).field("id"), "first defined here");

        let adapter = DiagnosticAdapter::new(&diag, SOURCE);

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());

        let second = &SOURCE[labels[0].offset()..labels[0].offset() + labels[0].len()];
        assert_eq!(second, "\"a\"");
        assert!(labels[0].offset() > labels[1].offset());
        assert_eq!(
            labels[0].label(),
            Some("duplicate definition (/nodes/1/id)")
        );
    }

    #[test]
    fn test_unparseable_source_has_no_labels() {
        let diag = Diagnostic::error("invalid JSON").with_label(Location::root(), "here");
        let adapter = DiagnosticAdapter::new(&diag, "not json at all");
        assert!(adapter.labels().is_none());
    }
}
