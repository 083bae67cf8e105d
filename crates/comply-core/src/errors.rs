//! Cross-cutting error types for the compliance engine.
//!
//! Storage errors (`DatabaseError`) live in `comply-db`; configuration errors
//! live in `comply-config`. Everything here can be raised without touching
//! the database.

use thiserror::Error;

/// Errors that can be raised by any comply crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A stored version string could not be parsed as dot-separated integers.
    #[error("Invalid version string '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Data failed validation (range, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The external content generator failed.
    #[error("Content generation failed: {0}")]
    Generation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
