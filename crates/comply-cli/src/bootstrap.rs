use anyhow::Context;
use comply_config::ComplyConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, then layered configuration. `--db` beats every other
/// source for the database path.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<ComplyConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded dotenv file"),
        Err(error) if error.not_found() => {}
        Err(error) => return Err(error).context("failed to load .env file"),
    }

    let mut config = ComplyConfig::load()?;
    if let Some(path) = &flags.db {
        config.database.path.clone_from(path);
    }
    Ok(config)
}
