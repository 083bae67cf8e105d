//! Documents created from generated content.

use comply_core::entities::Document;
use comply_core::generation::{AI_GENERATED_KEY, ContentGenerator, GenerationRequest};
use serde_json::{Map, Value};

use crate::error::DatabaseError;
use crate::repos::document::NewDocument;
use crate::service::ComplyService;

/// Framework requirements are stored as one `;`-separated string.
fn split_requirements(requirements: Option<&str>) -> Vec<String> {
    requirements
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect()
}

fn mark_generated(metadata: Option<Value>) -> Result<Value, DatabaseError> {
    let mut map = match metadata {
        None => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(DatabaseError::Validation(format!(
                "document metadata must be a JSON object, got {other}"
            )));
        }
    };
    map.insert(AI_GENERATED_KEY.to_string(), Value::Bool(true));
    Ok(Value::Object(map))
}

impl ComplyService {
    /// Ask `generator` for content and store it as a new document.
    ///
    /// `input.content` is replaced by the generated text and the document
    /// metadata gains `ai_generated: true`. Nothing is stored when the
    /// generator fails.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the framework is missing.
    /// - `Core(Generation)` if the generator fails.
    /// - Anything [`ComplyService::create_document`] returns.
    pub async fn create_generated<G: ContentGenerator>(
        &self,
        mut input: NewDocument,
        company_context: Option<&str>,
        generator: &G,
        author_id: &str,
    ) -> Result<Document, DatabaseError> {
        let framework = self.get_framework(&input.framework_id).await?;
        let metadata = mark_generated(input.metadata.take())?;

        let request = GenerationRequest {
            framework_name: framework.name,
            requirements: split_requirements(framework.requirements.as_deref()),
            title: input.title.clone(),
            description: input.description.clone(),
            company_context: company_context.map(String::from),
        };

        input.content = generator.generate(&request).await?;
        input.metadata = Some(metadata);
        tracing::debug!(
            framework_id = %input.framework_id,
            bytes = input.content.len(),
            "generated document content"
        );

        self.create_document(input, author_id).await
    }
}
