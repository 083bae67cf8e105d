//! Framework metadata update builder. The framework type is not patchable.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameworkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl FrameworkUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.requirements.is_none()
            && self.categories.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Default)]
pub struct FrameworkUpdateBuilder(FrameworkUpdate);

impl FrameworkUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn requirements(mut self, requirements: Option<String>) -> Self {
        self.0.requirements = Some(requirements);
        self
    }

    #[must_use]
    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.0.categories = Some(categories);
        self
    }

    #[must_use]
    pub const fn is_active(mut self, is_active: bool) -> Self {
        self.0.is_active = Some(is_active);
        self
    }

    #[must_use]
    pub fn build(self) -> FrameworkUpdate {
        self.0
    }
}
