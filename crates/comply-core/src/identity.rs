use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Authenticated caller identity handed to the engine by the auth layer.
///
/// The engine trusts this context and performs no authorization of its own.
/// It is used to attribute audit entries.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuthIdentity {
    /// ID of the acting user (`usr-...`).
    pub user_id: String,
    /// Organization of the acting user (`org-...`).
    pub organization_id: Option<String>,
}

impl AuthIdentity {
    #[must_use]
    pub fn new(user_id: impl Into<String>, organization_id: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            organization_id,
        }
    }
}
