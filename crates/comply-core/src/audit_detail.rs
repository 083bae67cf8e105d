//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. These types
//! give the most common shapes a schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::progress::TaskCounts;

/// Detail for `AuditAction::StatusChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
}

/// Detail for `AuditAction::VersionAppended`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VersionAppendedDetail {
    pub version_id: String,
    pub version: String,
    pub change_log: Option<String>,
}

/// Detail for `AuditAction::CollaboratorAdded` and `AuditAction::CollaboratorRemoved`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CollaboratorDetail {
    pub user_id: String,
    /// `false` when the operation was a no-op (already present / already absent).
    pub changed: bool,
}

/// Detail for `AuditAction::Recomputed`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RecomputedDetail {
    pub counts: TaskCounts,
    pub percentage: f64,
}
