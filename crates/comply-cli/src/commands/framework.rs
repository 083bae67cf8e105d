use comply_core::catalog::FrameworkDefinition;
use comply_core::entities::Framework;
use comply_core::enums::FrameworkType;
use comply_db::updates::framework::FrameworkUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::FrameworkCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply framework`.
pub async fn handle(
    action: &FrameworkCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        FrameworkCommands::List { all } => {
            let frameworks = ctx.service.list_frameworks(*all).await?;
            output(&frameworks, flags.format)
        }
        FrameworkCommands::Get { key } => {
            let framework = resolve(ctx, key).await?;
            output(&framework, flags.format)
        }
        FrameworkCommands::Seed => {
            let frameworks = ctx
                .service
                .ensure_seeded(&FrameworkDefinition::builtin())
                .await?;
            output(&frameworks, flags.format)
        }
        FrameworkCommands::Update {
            id,
            name,
            description,
            requirements,
            categories,
            activate,
            deactivate,
        } => {
            let mut builder = FrameworkUpdateBuilder::new();
            if let Some(name) = name {
                builder = builder.name(name);
            }
            if let Some(description) = description {
                builder = builder.description(Some(description.clone()));
            }
            if let Some(requirements) = requirements {
                builder = builder.requirements(Some(requirements.clone()));
            }
            if let Some(categories) = categories {
                builder = builder.categories(categories.clone());
            }
            if *activate || *deactivate {
                builder = builder.is_active(*activate);
            }

            let update = builder.build();
            if update.is_empty() {
                anyhow::bail!(
                    "At least one of --name, --description, --requirements, --categories, --activate, or --deactivate must be provided"
                );
            }
            let framework = ctx.service.update_framework(id, update).await?;
            output(&framework, flags.format)
        }
    }
}

/// Look a framework up by ID (`fwk-...`) or by type name.
pub async fn resolve(ctx: &AppContext, key: &str) -> anyhow::Result<Framework> {
    if key.starts_with("fwk-") {
        return Ok(ctx.service.get_framework(key).await?);
    }
    let framework_type: FrameworkType = key.parse()?;
    Ok(ctx.service.get_framework_by_type(framework_type).await?)
}
