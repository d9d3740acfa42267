//! Error codes for the mxweave diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Input errors (the document itself)
//! - `E1xx` - Schema shape errors
//! - `E2xx` - Validation errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Input Errors (E0xx)
    // =========================================================================
    /// Input is not an object.
    ///
    /// The top-level JSON value must be an object.
    E001,

    /// Invalid JSON.
    ///
    /// The input could not be parsed as JSON, even after extracting the
    /// outermost `{ ... }` block.
    E002,

    // =========================================================================
    // Schema Errors (E1xx)
    // =========================================================================
    /// Unexpected value shape.
    ///
    /// A value has the wrong JSON type for the selected mode's schema.
    E100,

    /// Missing required field.
    ///
    /// A field required by the selected mode's schema is absent.
    E101,

    // =========================================================================
    // Validation Errors (E2xx)
    // =========================================================================
    /// Empty node id.
    E200,

    /// Duplicate node id.
    ///
    /// Two nodes of the same diagram share an id.
    E201,

    /// Reserved id sequence.
    ///
    /// Node ids must not contain `::`, which is reserved for generated cells.
    E202,

    /// Unknown edge endpoint.
    ///
    /// An edge references a node id that is not defined.
    E203,

    /// Invalid direction.
    ///
    /// Valid directions are `TD`, `TB` and `LR`.
    E204,

    /// Invalid mode.
    ///
    /// The `mode` field names a mode that does not exist.
    E205,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            // Input errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            // Schema errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            // Validation errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Input errors
            ErrorCode::E001 => "input is not an object",
            ErrorCode::E002 => "invalid JSON",
            // Schema errors
            ErrorCode::E100 => "unexpected value shape",
            ErrorCode::E101 => "missing required field",
            // Validation errors
            ErrorCode::E200 => "empty node id",
            ErrorCode::E201 => "duplicate node id",
            ErrorCode::E202 => "reserved id sequence",
            ErrorCode::E203 => "unknown edge endpoint",
            ErrorCode::E204 => "invalid direction",
            ErrorCode::E205 => "invalid mode",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
