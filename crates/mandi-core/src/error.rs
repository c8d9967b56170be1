//! # Validation Error Hierarchy
//!
//! Input-validation failures shared across the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//! HTTP status mapping happens in `mandi-api` — this crate only names the
//! failure.

use thiserror::Error;

/// A malformed or policy-violating input value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email address is structurally invalid.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// Password shorter than the minimum policy length.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Policy minimum.
        min: usize,
    },

    /// Unknown role string at the data-entry edge.
    #[error("unknown role: {0} (expected farmer, buyer, or transporter)")]
    UnknownRole(String),

    /// Unknown product status string.
    #[error("unknown product status: {0} (expected available, sold, or inactive)")]
    UnknownProductStatus(String),

    /// Unknown order status string.
    #[error("unknown order status: {0}")]
    UnknownOrderStatus(String),

    /// Amount string could not be parsed as a non-negative decimal.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A required field was missing or empty.
    #[error("{field} must not be empty")]
    MissingField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A numeric field violated its range constraint.
    #[error("{field}: {reason}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Constraint that was violated.
        reason: &'static str,
    },
}
