//! Database error types for comply-db.

use comply_core::enums::{EntityType, SideEffect};
use comply_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A referenced entity does not exist. Never retried.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityType, id: String },

    /// The referenced entities exist but do not fit together (e.g. a task
    /// framework that differs from its progress record's framework).
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// A duplicate-key race persisted past the retry budget.
    #[error("Conflict creating {entity} ({key}) after {attempts} attempts")]
    ConflictOnCreate {
        entity: EntityType,
        key: String,
        attempts: u32,
    },

    /// The primary write committed, a dependent side effect did not.
    #[error("{entity} {id} was saved but {effect} failed: {source}")]
    PartialFailure {
        entity: EntityType,
        id: String,
        effect: SideEffect,
        #[source]
        source: Box<DatabaseError>,
    },

    /// Input rejected before touching storage.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Domain error raised by comply-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    pub(crate) fn not_found(entity: EntityType, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wrap a side-effect failure, logging it distinctly from ordinary errors.
    pub(crate) fn partial(
        entity: EntityType,
        id: impl Into<String>,
        effect: SideEffect,
        source: Self,
    ) -> Self {
        let id = id.into();
        tracing::error!(
            entity = %entity,
            id = %id,
            effect = %effect,
            error = %source,
            "primary write committed but side effect failed"
        );
        Self::PartialFailure {
            entity,
            id,
            effect,
            source: Box::new(source),
        }
    }

    /// Whether the caller should treat this as a client error.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::InvalidReference(_) | Self::Validation(_)
        )
    }
}
