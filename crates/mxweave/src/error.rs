//! Error types for mxweave operations.
//!
//! This module provides the main error type [`MxweaveError`] which wraps
//! the error conditions that can occur while compiling a diagram.

use std::io;

use thiserror::Error;

use mxweave_schema::SpecValidationError;

/// The main error type for mxweave operations.
///
/// # Diagnostic Variants
///
/// The `Validation` variant carries the coded diagnostics of the schema
/// normalizer together with the input text, for rich error reporting.
#[derive(Debug, Error)]
pub enum MxweaveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Validation {
        err: SpecValidationError,
        src: String,
    },

    #[error("Style table error: {0}")]
    StyleTable(String),

    /// A validated specification broke a layout invariant.
    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl MxweaveError {
    /// Create a new `Validation` error with the associated input text.
    pub fn new_validation_error(err: SpecValidationError, src: impl Into<String>) -> Self {
        Self::Validation {
            err,
            src: src.into(),
        }
    }
}
