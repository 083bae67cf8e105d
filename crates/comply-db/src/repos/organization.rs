//! Organization and user repository.
//!
//! Reference entities only: the engine trusts the caller's identity and
//! keeps no credentials.

use comply_core::entities::{Organization, User};
use comply_core::enums::{AuditAction, EntityType};
use comply_core::ids::{PREFIX_ORGANIZATION, PREFIX_USER};

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, now, parse_datetime};
use crate::service::ComplyService;

const USER_COLS: &str = "id, organization_id, email, name, created_at";

fn row_to_organization(row: &libsql::Row) -> Result<Organization, DatabaseError> {
    Ok(Organization {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_datetime(&row.get::<String>(2)?)?,
    })
}

pub(crate) fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl ComplyService {
    pub async fn create_organization(&self, name: &str) -> Result<Organization, DatabaseError> {
        if name.trim().is_empty() {
            return Err(DatabaseError::Validation("organization name is empty".into()));
        }
        let now = now();
        let id = self.db().generate_id(PREFIX_ORGANIZATION).await?;
        let created_at = format_datetime(&now);

        self.db()
            .execute_with(
                "INSERT INTO organizations (id, name, created_at) VALUES (?1, ?2, ?3)",
                || libsql::params![id.as_str(), name, created_at.as_str()],
            )
            .await?;

        self.record_committed(EntityType::Organization, &id, AuditAction::Created, None)
            .await?;

        Ok(Organization {
            id,
            name: name.to_string(),
            created_at: now,
        })
    }

    pub async fn get_organization(&self, id: &str) -> Result<Organization, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT id, name, created_at FROM organizations WHERE id = ?1",
                || [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Organization, id))?;
        row_to_organization(&row)
    }

    pub async fn list_organizations(&self) -> Result<Vec<Organization>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT id, name, created_at FROM organizations ORDER BY created_at, rowid",
                || (),
            )
            .await?;
        let mut orgs = Vec::new();
        while let Some(row) = rows.next().await? {
            orgs.push(row_to_organization(&row)?);
        }
        Ok(orgs)
    }

    pub async fn create_user(
        &self,
        organization_id: &str,
        email: &str,
        name: &str,
    ) -> Result<User, DatabaseError> {
        if !email.contains('@') {
            return Err(DatabaseError::Validation(format!(
                "'{email}' is not an email address"
            )));
        }
        self.ensure_exists(EntityType::Organization, organization_id)
            .await?;

        let now = now();
        let id = self.db().generate_id(PREFIX_USER).await?;
        let created_at = format_datetime(&now);

        self.db()
            .execute_with(
                &format!("INSERT INTO users ({USER_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                || {
                    libsql::params![
                        id.as_str(),
                        organization_id,
                        email,
                        name,
                        created_at.as_str()
                    ]
                },
            )
            .await?;

        self.record_committed(EntityType::User, &id, AuditAction::Created, None)
            .await?;

        Ok(User {
            id,
            organization_id: organization_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: now,
        })
    }

    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {USER_COLS} FROM users WHERE id = ?1"),
                || [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::User, id))?;
        row_to_user(&row)
    }

    pub async fn list_users(&self, organization_id: &str) -> Result<Vec<User>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {USER_COLS} FROM users WHERE organization_id = ?1 ORDER BY created_at, rowid"
                ),
                || [organization_id],
            )
            .await?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }
}
