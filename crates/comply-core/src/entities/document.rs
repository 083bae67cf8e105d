use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::DocumentStatus;

/// A collaboratively authored compliance document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Opaque rich-text content.
    pub content: String,
    pub status: DocumentStatus,
    /// Author-supplied completion, 0 to 100. Independent of compliance progress.
    pub progress: u8,
    pub template_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub framework_id: String,
    pub organization_id: String,
    pub created_by_id: String,
    /// Collaborator user IDs, duplicate-free, in the order they were added.
    pub collaborator_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
