use comply_core::entities::TextSelection;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CommentCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply comment`.
pub async fn handle(
    action: &CommentCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        CommentCommands::Add {
            doc,
            content,
            parent,
            start,
            end,
            text,
        } => {
            let author = ctx.require_user()?;
            let selection = match (start, end, text) {
                (Some(start), Some(end), Some(text)) => Some(TextSelection {
                    start: *start,
                    end: *end,
                    selected_text: text.clone(),
                }),
                _ => None,
            };
            let comment = ctx
                .service
                .add_comment(doc, &author, content, selection, parent.as_deref())
                .await?;
            output(&comment, flags.format)
        }
        CommentCommands::List { doc } => {
            let threads = ctx.service.list_comments(doc).await?;
            output(&threads, flags.format)
        }
        CommentCommands::Replies { id } => {
            let replies = ctx.service.list_replies(id).await?;
            output(&replies, flags.format)
        }
        CommentCommands::Resolve { id } => {
            let comment = ctx.service.resolve_comment(id).await?;
            output(&comment, flags.format)
        }
    }
}
