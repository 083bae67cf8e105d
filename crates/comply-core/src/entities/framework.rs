use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::FrameworkType;

/// A regulatory framework in the catalog.
///
/// `framework_type` is unique and never changes after creation; the
/// remaining fields are editable metadata.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Framework {
    pub id: String,
    pub framework_type: FrameworkType,
    pub name: String,
    pub description: Option<String>,
    pub requirements: Option<String>,
    /// Ordered category labels (e.g. "Network Security", "Access Control").
    pub categories: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
