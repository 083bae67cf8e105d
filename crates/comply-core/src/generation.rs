//! Seam for the external AI document-generation service.
//!
//! The engine only knows the request/response shape. Generated content is
//! stored exactly like hand-written content; the caller may flag its
//! provenance through document metadata.

use std::future::Future;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Metadata key set to `true` on documents created from generated content.
pub const AI_GENERATED_KEY: &str = "ai_generated";

/// Input handed to a content generator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GenerationRequest {
    pub framework_name: String,
    pub requirements: Vec<String>,
    pub title: String,
    pub description: Option<String>,
    pub company_context: Option<String>,
}

/// Produces document content for a framework.
pub trait ContentGenerator: Send + Sync {
    /// Generate document content.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Generation` when the backing service fails.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;
}
