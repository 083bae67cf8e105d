//! Comment threads on documents.
//!
//! A comment may anchor to a text range of the document and may reply to
//! another comment on the same document. Deleting a comment removes its
//! replies.

use comply_core::entities::{Comment, TextSelection};
use comply_core::enums::{AuditAction, EntityType};
use comply_core::ids::PREFIX_COMMENT;
use comply_core::responses::{CommentReply, CommentThread};

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_bool, get_opt_string, now, parse_datetime};
use crate::service::ComplyService;

const SELECT_COLS: &str = "id, document_id, author_id, parent_id, content, selection_start, \
     selection_end, selected_text, resolved, created_at, updated_at";

fn row_to_comment(row: &libsql::Row) -> Result<Comment, DatabaseError> {
    let start = row.get::<Option<i64>>(5)?;
    let end = row.get::<Option<i64>>(6)?;
    let text = row.get::<Option<String>>(7)?;
    let selection = match (start, end, text) {
        (Some(start), Some(end), Some(selected_text)) => Some(TextSelection {
            start: offset(start)?,
            end: offset(end)?,
            selected_text,
        }),
        _ => None,
    };

    Ok(Comment {
        id: row.get(0)?,
        document_id: row.get(1)?,
        author_id: row.get(2)?,
        parent_id: get_opt_string(row, 3)?,
        content: row.get(4)?,
        selection,
        resolved: get_bool(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn offset(raw: i64) -> Result<u32, DatabaseError> {
    u32::try_from(raw)
        .map_err(|_| DatabaseError::InvalidState(format!("selection offset out of range: {raw}")))
}

impl ComplyService {
    /// Add a comment, optionally anchored to a selection and/or replying to
    /// `parent_id`.
    ///
    /// # Errors
    ///
    /// - `Validation` for empty content or a selection with `start > end`.
    /// - `NotFound` if the document, author, or parent is missing.
    /// - `InvalidReference` if the parent belongs to another document.
    pub async fn add_comment(
        &self,
        document_id: &str,
        author_id: &str,
        content: &str,
        selection: Option<TextSelection>,
        parent_id: Option<&str>,
    ) -> Result<Comment, DatabaseError> {
        if content.trim().is_empty() {
            return Err(DatabaseError::Validation("comment content is empty".into()));
        }
        if let Some(ref sel) = selection
            && sel.start > sel.end
        {
            return Err(DatabaseError::Validation(format!(
                "selection start {} is after end {}",
                sel.start, sel.end
            )));
        }

        self.ensure_exists(EntityType::Document, document_id).await?;
        self.ensure_exists(EntityType::User, author_id).await?;
        if let Some(parent_id) = parent_id {
            let parent = self.get_comment(parent_id).await?;
            if parent.document_id != document_id {
                return Err(DatabaseError::InvalidReference(format!(
                    "parent comment {parent_id} belongs to document {}, not {document_id}",
                    parent.document_id
                )));
            }
        }

        let id = self.db().generate_id(PREFIX_COMMENT).await?;
        let ts = format_datetime(&now());
        let (start, end, text) = match selection {
            Some(ref sel) => (
                Some(i64::from(sel.start)),
                Some(i64::from(sel.end)),
                Some(sel.selected_text.as_str()),
            ),
            None => (None, None, None),
        };

        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO comments ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10)"
                ),
                || {
                    libsql::params![
                        id.as_str(),
                        document_id,
                        author_id,
                        parent_id,
                        content,
                        start,
                        end,
                        text,
                        ts.as_str(),
                        ts.as_str()
                    ]
                },
            )
            .await?;

        self.record_committed(EntityType::Comment, &id, AuditAction::Created, None)
            .await?;
        self.get_comment(&id).await
    }

    pub async fn get_comment(&self, id: &str) -> Result<Comment, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM comments WHERE id = ?1"),
                || [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Comment, id))?;
        row_to_comment(&row)
    }

    /// Top-level comments of a document, oldest first, each with its author
    /// and direct replies.
    pub async fn list_comments(&self, document_id: &str) -> Result<Vec<CommentThread>, DatabaseError> {
        self.ensure_exists(EntityType::Document, document_id).await?;

        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM comments
                     WHERE document_id = ?1 AND parent_id IS NULL
                     ORDER BY created_at, rowid"
                ),
                || [document_id],
            )
            .await?;
        let mut top_level = Vec::new();
        while let Some(row) = rows.next().await? {
            top_level.push(row_to_comment(&row)?);
        }

        let mut threads = Vec::with_capacity(top_level.len());
        for comment in top_level {
            let author = self.get_user(&comment.author_id).await?;
            let replies = self.list_replies(&comment.id).await?;
            threads.push(CommentThread {
                comment,
                author,
                replies,
            });
        }
        Ok(threads)
    }

    /// Direct replies to a comment, oldest first.
    pub async fn list_replies(&self, comment_id: &str) -> Result<Vec<CommentReply>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM comments WHERE parent_id = ?1
                     ORDER BY created_at, rowid"
                ),
                || [comment_id],
            )
            .await?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next().await? {
            comments.push(row_to_comment(&row)?);
        }

        let mut replies = Vec::with_capacity(comments.len());
        for comment in comments {
            let author = self.get_user(&comment.author_id).await?;
            replies.push(CommentReply { comment, author });
        }
        Ok(replies)
    }

    /// Flip the resolved flag of a comment.
    pub async fn resolve_comment(&self, id: &str) -> Result<Comment, DatabaseError> {
        self.ensure_exists(EntityType::Comment, id).await?;
        let ts = format_datetime(&now());
        self.db()
            .execute_with(
                "UPDATE comments SET resolved = NOT resolved, updated_at = ?1 WHERE id = ?2",
                || libsql::params![ts.as_str(), id],
            )
            .await?;

        let comment = self.get_comment(id).await?;
        let action = if comment.resolved {
            AuditAction::Resolved
        } else {
            AuditAction::Reopened
        };
        self.record_committed(EntityType::Comment, id, action, None)
            .await?;
        Ok(comment)
    }
}
