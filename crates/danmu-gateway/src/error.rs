//! Payload decode errors.

use thiserror::Error;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors produced while mapping a notification payload onto a typed event.
///
/// These never cross the routing boundary: the total `decode` constructors log the
/// error and fall back to a default-valued event.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The body is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field the mapping requires is absent or has the wrong shape.
    #[error("missing or malformed field: {0}")]
    MissingField(&'static str),
}
