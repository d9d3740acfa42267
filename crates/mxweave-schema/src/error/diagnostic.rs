//! The core diagnostic type for the mxweave error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, labeled document locations, and help text.

use std::fmt;

use crate::error::{ErrorCode, Label, Location, Severity};

/// A diagnostic message about the input document.
///
/// Diagnostics provide:
/// - A severity level
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - One or more labeled locations
/// - Optional help text with suggestions
///
/// # Example
///
/// ```text
/// error[E203]: edge references unknown node `Payment`
///   at /relations/0
///   = help: known ids: User, Auth
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use mxweave_schema::error::{Diagnostic, ErrorCode, Location};
    ///
    /// let diag = Diagnostic::error("missing required field `attributes`")
    ///     .with_code(ErrorCode::E101)
    ///     .with_label(Location::root().field("entities").index(0), "in this entity")
    ///     .with_help("use an empty list for entities without columns");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The location of the first primary label, if any.
    pub fn location(&self) -> Option<&Location> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::location)
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, location: Location, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(location, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, location: Location, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(location, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message at /pointer"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(location) = self.location() {
            if !location.is_root() {
                write!(f, " at {}", location)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Severity::Error, "test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.location().is_none());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_with_secondary_label() {
        let diag = Diagnostic::error("duplicate node id")
            .with_label(Location::root().field("nodes").index(3), "duplicate here")
            .with_secondary_label(Location::root().field("nodes").index(0), "first defined here");

        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(diag.labels()[1].is_secondary());
        assert_eq!(
            diag.location().map(Location::as_str),
            Some("/nodes/3")
        );
    }

    #[test]
    fn test_diagnostic_display_with_code_and_location() {
        let diag = Diagnostic::error("missing required field `attributes`")
            .with_code(ErrorCode::E101)
            .with_label(Location::root().field("entities").index(1), "here");

        assert_eq!(
            diag.to_string(),
            "error[E101]: missing required field `attributes` at /entities/1"
        );
    }

    #[test]
    fn test_diagnostic_display_root_location() {
        let diag = Diagnostic::warning("ambiguous mode").with_label(Location::root(), "here");

        assert_eq!(diag.to_string(), "warning: ambiguous mode");
    }
}
