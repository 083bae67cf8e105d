//! Composite read models returned by list and dashboard operations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Comment, ComplianceProgress, Document, Task, User};

/// A reply with its author resolved.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CommentReply {
    pub comment: Comment,
    pub author: User,
}

/// A top-level comment with its author and direct replies.
///
/// Replies of replies are not loaded; re-query with the reply's ID.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CommentThread {
    pub comment: Comment,
    pub author: User,
    pub replies: Vec<CommentReply>,
}

/// Organization-level overview for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DashboardResponse {
    pub organization_id: String,
    pub progress: Vec<ComplianceProgress>,
    /// Completion across every framework of the organization.
    pub overall_percentage: f64,
    pub priority_tasks: Vec<Task>,
    pub recent_documents: Vec<Document>,
}
