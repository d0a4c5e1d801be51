//! # Error Types
//!
//! Structured error types for fab_core. The estimator itself only ever raises
//! [`EstimateError::InvalidInput`], always before any arithmetic runs. The
//! other variants belong to the edges of the crate: loading rate sheets and
//! settings, parsing extraction output, and preset lookup.
//!
//! ## Example
//!
//! ```rust
//! use fab_core::errors::{Constraint, EstimateError, EstimateResult};
//!
//! fn validate_length(length: f64) -> EstimateResult<()> {
//!     if length < 0.0 {
//!         return Err(EstimateError::invalid_input(
//!             "material_length",
//!             length.to_string(),
//!             Constraint::Negative,
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_length(-1.0).is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for fab_core operations
pub type EstimateResult<T> = Result<T, EstimateError>;

/// The constraint an input value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// Required value was not supplied
    Missing,
    /// Value could not be read as a finite number
    NonNumeric,
    /// Count had a fractional part
    NotInteger,
    /// Value was below zero
    Negative,
    /// Value was below one (frame count)
    LessThanOne,
    /// Value exceeded the supported range
    OutOfRange,
    /// The same entry was given more than once
    Duplicate,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Constraint::Missing => "value is required",
            Constraint::NonNumeric => "value must be a finite number",
            Constraint::NotInteger => "value must be a whole number",
            Constraint::Negative => "value cannot be negative",
            Constraint::LessThanOne => "value must be at least 1",
            Constraint::OutOfRange => "value is out of range",
            Constraint::Duplicate => "value is given more than once",
        };
        f.write_str(text)
    }
}

/// Structured error type for estimation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EstimateError {
    /// An input value is missing, non-numeric, negative or out of range
    #[error("Invalid input for '{field}': {constraint} (got '{value}')")]
    InvalidInput {
        field: String,
        value: String,
        constraint: Constraint,
    },

    /// Rate sheet or settings file could not be interpreted
    #[error("Rate sheet error: {reason}")]
    SheetError { reason: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// No preset with this identifier
    #[error("Unknown frame preset: {id}")]
    UnknownPreset { id: String },
}

impl EstimateError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, constraint: Constraint) -> Self {
        EstimateError::InvalidInput {
            field: field.into(),
            value: value.into(),
            constraint,
        }
    }

    /// Create an InvalidInput error for a value that was never supplied
    pub fn missing(field: impl Into<String>) -> Self {
        EstimateError::invalid_input(field, "", Constraint::Missing)
    }

    /// Create a SheetError
    pub fn sheet(reason: impl Into<String>) -> Self {
        EstimateError::SheetError { reason: reason.into() }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        EstimateError::SerializationError { reason: reason.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownPreset error
    pub fn unknown_preset(id: impl Into<String>) -> Self {
        EstimateError::UnknownPreset { id: id.into() }
    }

    /// Name of the offending field, for errors tied to a single input
    pub fn field(&self) -> Option<&str> {
        match self {
            EstimateError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Violated constraint, for InvalidInput errors
    pub fn constraint(&self) -> Option<Constraint> {
        match self {
            EstimateError::InvalidInput { constraint, .. } => Some(*constraint),
            _ => None,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EstimateError::InvalidInput { .. } => "INVALID_INPUT",
            EstimateError::SheetError { .. } => "SHEET_ERROR",
            EstimateError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EstimateError::FileError { .. } => "FILE_ERROR",
            EstimateError::UnknownPreset { .. } => "UNKNOWN_PRESET",
        }
    }
}

impl From<serde_json::Error> for EstimateError {
    fn from(err: serde_json::Error) -> Self {
        EstimateError::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for EstimateError {
    fn from(err: toml::de::Error) -> Self {
        EstimateError::sheet(err.to_string())
    }
}
