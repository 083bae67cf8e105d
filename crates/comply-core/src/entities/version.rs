use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An immutable content snapshot of a document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DocumentVersion {
    pub id: String,
    pub document_id: String,
    /// `MAJOR.MINOR.PATCH`, unique per document.
    pub version: String,
    pub content: String,
    pub change_log: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_by_id: String,
    pub created_at: DateTime<Utc>,
}
