use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::progress::TaskCounts;

/// Denormalized task counters for one (organization, framework) pair.
///
/// The counters are the source of truth between recomputes; `percentage` is
/// always derivable from them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ComplianceProgress {
    pub id: String,
    pub organization_id: String,
    pub framework_id: String,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub in_progress_tasks: u32,
    pub pending_tasks: u32,
    pub percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComplianceProgress {
    #[must_use]
    pub const fn counts(&self) -> TaskCounts {
        TaskCounts {
            total: self.total_tasks,
            completed: self.completed_tasks,
            in_progress: self.in_progress_tasks,
            pending: self.pending_tasks,
        }
    }
}
