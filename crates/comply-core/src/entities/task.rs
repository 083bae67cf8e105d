use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{TaskPriority, TaskStatus};

/// A unit of compliance work toward one framework's requirements.
///
/// `framework_id` always matches the framework of `compliance_progress_id`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    /// Stamped when the task first enters `completed`; kept on re-saves.
    pub completed_at: Option<DateTime<Utc>>,
    /// Requirement labels this task addresses (e.g. "PCI-DSS 8.3").
    pub requirements: Vec<String>,
    pub notes: Option<String>,
    pub framework_id: String,
    pub compliance_progress_id: String,
    pub assignee_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
