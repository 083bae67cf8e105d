//! Repository modules implementing operations for all compliance entities.
//!
//! Each module adds methods to `ComplyService` via `impl ComplyService` blocks.

pub mod audit;
pub mod comment;
pub mod dashboard;
pub mod document;
pub mod framework;
pub mod generation;
pub mod organization;
pub mod progress;
pub mod task;
pub mod version;

use comply_core::enums::EntityType;

use crate::error::DatabaseError;
use crate::helpers::entity_type_to_table;
use crate::service::ComplyService;

impl ComplyService {
    /// Verify that `id` exists before it is written as a foreign key.
    pub(crate) async fn ensure_exists(
        &self,
        entity: EntityType,
        id: &str,
    ) -> Result<(), DatabaseError> {
        let table = entity_type_to_table(entity);
        let mut rows = self
            .db()
            .query_with(&format!("SELECT 1 FROM {table} WHERE id = ?1"), || [id])
            .await?;
        if rows.next().await?.is_some() {
            Ok(())
        } else {
            Err(DatabaseError::not_found(entity, id))
        }
    }
}
