//! Error and diagnostic system for the mxweave schema normalizer.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled JSON locations for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, one or more
//! locations in the input document, and help text. Multiple diagnostics are
//! wrapped in [`SpecValidationError`] when normalization fails.
//!
//! # Example
//!
//! ```
//! # use mxweave_schema::error::{Diagnostic, ErrorCode, Location};
//!
//! let entities = Location::root().field("entities");
//!
//! let diag = Diagnostic::error("node id `User` is defined multiple times")
//!     .with_code(ErrorCode::E201)
//!     .with_label(entities.index(2).field("name"), "duplicate definition")
//!     .with_secondary_label(entities.index(0).field("name"), "first defined here")
//!     .with_help("rename one of the nodes");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod location;
mod severity;
mod validation_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use location::Location;
pub use severity::Severity;
pub use validation_error::SpecValidationError;
