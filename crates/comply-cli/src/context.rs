use anyhow::Context;
use comply_config::ComplyConfig;
use comply_core::identity::AuthIdentity;
use comply_db::service::ComplyService;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: ComplyService,
    pub config: ComplyConfig,
}

impl AppContext {
    pub async fn init(config: ComplyConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let identity = flags
            .user
            .as_deref()
            .map(|user_id| AuthIdentity::new(user_id, None));

        let service = ComplyService::open(&config.database, identity)
            .await
            .with_context(|| format!("cannot open database at {}", config.database.path))?;
        tracing::debug!(path = %config.database.path, "database ready");

        Ok(Self { service, config })
    }

    /// The acting user, required by commands that author content.
    pub fn require_user(&self) -> anyhow::Result<String> {
        self.service
            .actor_id()
            .map(String::from)
            .context("this command needs an acting user; pass --user <usr-id>")
    }
}
