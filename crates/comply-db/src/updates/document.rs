//! Document update builder.
//!
//! Framework, organization, and creator are fixed at creation and have no
//! setter. Collaborators change through the dedicated set operations.

use serde::Serialize;

use comply_core::enums::DocumentStatus;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    /// Replacing content with different text appends a version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Change log for the version appended by a content change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_log: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Option<serde_json::Value>>,
}

#[derive(Default)]
pub struct DocumentUpdateBuilder(DocumentUpdate);

impl DocumentUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.0.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn change_log(mut self, change_log: impl Into<String>) -> Self {
        self.0.change_log = Some(change_log.into());
        self
    }

    #[must_use]
    pub const fn status(mut self, status: DocumentStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub const fn progress(mut self, progress: u8) -> Self {
        self.0.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn template_id(mut self, template_id: Option<String>) -> Self {
        self.0.template_id = Some(template_id);
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: Option<serde_json::Value>) -> Self {
        self.0.metadata = Some(metadata);
        self
    }

    #[must_use]
    pub fn build(self) -> DocumentUpdate {
        self.0
    }
}
