//! Status enums, priorities, entity types, and actions for the compliance engine.
//!
//! All storage-facing enums use `snake_case` serialization via
//! `#[serde(rename_all = "snake_case")]`, except `FrameworkType`, which keeps
//! the regulator's spelling (`PCI-DSS`, `SOC2`, ...).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// FrameworkType
// ---------------------------------------------------------------------------

/// Regulatory framework identity. Unique across the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FrameworkType {
    #[serde(rename = "PCI-DSS")]
    PciDss,
    #[serde(rename = "SOC2")]
    Soc2,
    #[serde(rename = "GDPR")]
    Gdpr,
    #[serde(rename = "ISO27001")]
    Iso27001,
    #[serde(rename = "HIPAA")]
    Hipaa,
}

impl FrameworkType {
    pub const ALL: [Self; 5] = [
        Self::PciDss,
        Self::Soc2,
        Self::Gdpr,
        Self::Iso27001,
        Self::Hipaa,
    ];

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PciDss => "PCI-DSS",
            Self::Soc2 => "SOC2",
            Self::Gdpr => "GDPR",
            Self::Iso27001 => "ISO27001",
            Self::Hipaa => "HIPAA",
        }
    }
}

impl fmt::Display for FrameworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameworkType {
    type Err = CoreError;

    /// Case-insensitive; separators are ignored so `pci_dss`, `pci-dss` and
    /// `PCIDSS` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().replace('-', "") == normalized)
            .ok_or_else(|| CoreError::Validation(format!("unknown framework type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Status of a compliance task.
///
/// Any status may follow any other. `Blocked` is an exception state: it
/// counts toward a progress record's total but toward none of its buckets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }

    /// Whether moving from `self` to `next` enters the completed state.
    #[must_use]
    pub fn enters_completed(self, next: Self) -> bool {
        self != Self::Completed && next == Self::Completed
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaskPriority
// ---------------------------------------------------------------------------

/// Priority of a compliance task.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// High and critical tasks surface on the priority list.
    #[must_use]
    pub const fn is_urgent(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DocumentStatus
// ---------------------------------------------------------------------------

/// Editorial status of a compliance document.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    InReview,
    Approved,
    Published,
    Archived,
}

impl DocumentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// What happened to an entity, as recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    StatusChanged,
    Recomputed,
    VersionAppended,
    CollaboratorAdded,
    CollaboratorRemoved,
    Resolved,
    Reopened,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::StatusChanged => "status_changed",
            Self::Recomputed => "recomputed",
            Self::VersionAppended => "version_appended",
            Self::CollaboratorAdded => "collaborator_added",
            Self::CollaboratorRemoved => "collaborator_removed",
            Self::Resolved => "resolved",
            Self::Reopened => "reopened",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Kind of entity, used by the audit trail and by `NotFound` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Organization,
    User,
    Framework,
    ComplianceProgress,
    Task,
    Document,
    DocumentVersion,
    Comment,
    Audit,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::User => "user",
            Self::Framework => "framework",
            Self::ComplianceProgress => "compliance_progress",
            Self::Task => "task",
            Self::Document => "document",
            Self::DocumentVersion => "document_version",
            Self::Comment => "comment",
            Self::Audit => "audit",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SideEffect
// ---------------------------------------------------------------------------

/// Dependent write that follows a primary mutation.
///
/// When one of these fails after the primary write committed, the caller
/// receives a partial failure naming the effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    /// Recomputing a compliance-progress record after a task mutation.
    ProgressRecompute,
    /// Appending a document version after a content change.
    VersionAppend,
    /// Creating the (organization, framework) progress row for a new document.
    ProgressInit,
    /// Writing the audit entry for a committed mutation.
    Audit,
}

impl SideEffect {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProgressRecompute => "progress_recompute",
            Self::VersionAppend => "version_append",
            Self::ProgressInit => "progress_init",
            Self::Audit => "audit",
        }
    }
}

impl fmt::Display for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
