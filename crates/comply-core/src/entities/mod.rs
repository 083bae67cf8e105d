//! Entity structs for all compliance domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `comply-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON output and schema validation.

mod audit;
mod comment;
mod document;
mod framework;
mod organization;
mod progress;
mod task;
mod version;

pub use audit::AuditEntry;
pub use comment::{Comment, TextSelection};
pub use document::Document;
pub use framework::Framework;
pub use organization::{Organization, User};
pub use progress::ComplianceProgress;
pub use task::Task;
pub use version::DocumentVersion;
