use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A text range a comment is anchored to.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TextSelection {
    pub start: u32,
    pub end: u32,
    pub selected_text: String,
}

/// A comment on a document, optionally replying to another comment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub document_id: String,
    pub author_id: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub selection: Option<TextSelection>,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
