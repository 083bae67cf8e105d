use comply_core::enums::DocumentStatus;
use comply_db::repos::document::NewDocument;
use comply_db::updates::document::DocumentUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DocCommands;
use crate::commands::framework::resolve;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_enum, read_content};
use crate::context::AppContext;
use crate::output::{Deleted, output};

/// Handle `comply doc`.
#[allow(clippy::too_many_lines)]
pub async fn handle(action: &DocCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let limit = effective_limit(flags.limit, ctx.config.general.default_limit);

    match action {
        DocCommands::Create {
            org,
            framework,
            title,
            description,
            content,
            content_file,
            status,
            template,
            collaborator,
        } => {
            let author = ctx.require_user()?;
            let framework = resolve(ctx, framework).await?;
            let input = NewDocument {
                title: title.clone(),
                description: description.clone(),
                content: read_content(content.as_deref(), content_file.as_deref())?
                    .unwrap_or_default(),
                status: status
                    .as_deref()
                    .map(|value| parse_enum::<DocumentStatus>(value, "status"))
                    .transpose()?,
                template_id: template.clone(),
                framework_id: framework.id,
                organization_id: org.clone(),
                collaborator_ids: collaborator.clone(),
                ..NewDocument::default()
            };
            let doc = ctx.service.create_document(input, &author).await?;
            output(&doc, flags.format)
        }
        DocCommands::Update {
            id,
            title,
            description,
            content,
            content_file,
            change_log,
            status,
            progress,
        } => {
            let editor = ctx.require_user()?;
            let mut builder = DocumentUpdateBuilder::new();
            if let Some(title) = title {
                builder = builder.title(title);
            }
            if let Some(description) = description {
                builder = builder.description(Some(description.clone()));
            }
            if let Some(content) = read_content(content.as_deref(), content_file.as_deref())? {
                builder = builder.content(content);
            }
            if let Some(change_log) = change_log {
                builder = builder.change_log(change_log);
            }
            if let Some(status) = status.as_deref() {
                builder = builder.status(parse_enum::<DocumentStatus>(status, "status")?);
            }
            if let Some(progress) = progress {
                builder = builder.progress(*progress);
            }
            let doc = ctx
                .service
                .update_document(id, builder.build(), &editor)
                .await?;
            output(&doc, flags.format)
        }
        DocCommands::Get { id } => {
            let doc = ctx.service.get_document(id).await?;
            output(&doc, flags.format)
        }
        DocCommands::Delete { id } => {
            ctx.service.delete_document(id).await?;
            output(&Deleted { id, deleted: true }, flags.format)
        }
        DocCommands::List { org, framework } => {
            let framework_id = match framework {
                Some(key) => Some(resolve(ctx, key).await?.id),
                None => None,
            };
            let docs = ctx
                .service
                .list_documents(org.as_deref(), framework_id.as_deref(), Some(limit))
                .await?;
            output(&docs, flags.format)
        }
        DocCommands::Search { query } => {
            let docs = ctx.service.search_documents(query, limit).await?;
            output(&docs, flags.format)
        }
        DocCommands::Versions { id } => {
            let versions = ctx.service.list_versions(id).await?;
            output(&versions, flags.format)
        }
        DocCommands::Version { id } => {
            let version = ctx.service.get_version(id).await?;
            output(&version, flags.format)
        }
        DocCommands::AddCollaborator { id, user_id } => {
            let doc = ctx.service.add_collaborator(id, user_id).await?;
            output(&doc, flags.format)
        }
        DocCommands::RemoveCollaborator { id, user_id } => {
            let doc = ctx.service.remove_collaborator(id, user_id).await?;
            output(&doc, flags.format)
        }
    }
}
