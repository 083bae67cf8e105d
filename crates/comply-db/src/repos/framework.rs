//! Framework catalog repository.
//!
//! Frameworks are keyed by their unique type-name. Seeding is an idempotent
//! find-or-create; only metadata is editable afterwards and nothing is ever
//! hard-deleted (deactivate instead).

use comply_core::catalog::FrameworkDefinition;
use comply_core::entities::Framework;
use comply_core::enums::{AuditAction, EntityType, FrameworkType};
use comply_core::ids::PREFIX_FRAMEWORK;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_bool, get_opt_string, now, opt_value, parse_datetime, parse_enum,
    parse_string_list, to_json,
};
use crate::retry::find_or_create;
use crate::service::ComplyService;
use crate::updates::framework::FrameworkUpdate;

const SELECT_COLS: &str =
    "id, type, name, description, requirements, categories, is_active, created_at, updated_at";

fn row_to_framework(row: &libsql::Row) -> Result<Framework, DatabaseError> {
    Ok(Framework {
        id: row.get(0)?,
        framework_type: parse_enum(&row.get::<String>(1)?)?,
        name: row.get(2)?,
        description: get_opt_string(row, 3)?,
        requirements: get_opt_string(row, 4)?,
        categories: parse_string_list(&row.get::<String>(5)?)?,
        is_active: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl ComplyService {
    /// Create every definition whose type is not yet in the catalog.
    ///
    /// Returns the catalog row for each definition, in input order. A lost
    /// insert race is resolved by re-reading the winner's row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::ConflictOnCreate` if a type keeps conflicting
    /// past the retry budget, or `DatabaseError` on storage failure.
    pub async fn ensure_seeded(
        &self,
        definitions: &[FrameworkDefinition],
    ) -> Result<Vec<Framework>, DatabaseError> {
        let mut frameworks = Vec::with_capacity(definitions.len());
        for def in definitions {
            frameworks.push(self.find_or_create_framework(def).await?);
        }
        Ok(frameworks)
    }

    async fn find_or_create_framework(
        &self,
        def: &FrameworkDefinition,
    ) -> Result<Framework, DatabaseError> {
        let key = def.framework_type.to_string();
        let attempts = self.conflict_attempts();
        find_or_create(
            &key,
            attempts,
            || self.find_framework_by_type(def.framework_type),
            || self.insert_framework(def),
        )
        .await?
        .ok_or(DatabaseError::ConflictOnCreate {
            entity: EntityType::Framework,
            key,
            attempts,
        })
    }

    async fn insert_framework(&self, def: &FrameworkDefinition) -> Result<Framework, DatabaseError> {
        let now = now();
        let id = self.db().generate_id(PREFIX_FRAMEWORK).await?;
        let categories = to_json(&def.categories)?;
        let ts = format_datetime(&now);

        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO frameworks ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8)"
                ),
                || {
                    libsql::params![
                        id.as_str(),
                        def.framework_type.as_str(),
                        def.name.as_str(),
                        def.description.as_deref(),
                        def.requirements.as_deref(),
                        categories.as_str(),
                        ts.as_str(),
                        ts.as_str()
                    ]
                },
            )
            .await?;

        self.record_committed(EntityType::Framework, &id, AuditAction::Created, None)
            .await?;

        Ok(Framework {
            id,
            framework_type: def.framework_type,
            name: def.name.clone(),
            description: def.description.clone(),
            requirements: def.requirements.clone(),
            categories: def.categories.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_framework_by_type(
        &self,
        framework_type: FrameworkType,
    ) -> Result<Option<Framework>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM frameworks WHERE type = ?1"),
                || [framework_type.as_str()],
            )
            .await?;
        rows.next()
            .await?
            .map(|row| row_to_framework(&row))
            .transpose()
    }

    pub async fn get_framework(&self, id: &str) -> Result<Framework, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM frameworks WHERE id = ?1"),
                || [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Framework, id))?;
        row_to_framework(&row)
    }

    pub async fn get_framework_by_type(
        &self,
        framework_type: FrameworkType,
    ) -> Result<Framework, DatabaseError> {
        self.find_framework_by_type(framework_type)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Framework, framework_type.as_str()))
    }

    /// Active frameworks in insertion order.
    pub async fn list_active_frameworks(&self) -> Result<Vec<Framework>, DatabaseError> {
        self.list_frameworks(false).await
    }

    /// All frameworks in insertion order, optionally including inactive ones.
    pub async fn list_frameworks(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<Framework>, DatabaseError> {
        let filter = if include_inactive {
            ""
        } else {
            "WHERE is_active = 1"
        };
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM frameworks {filter} ORDER BY rowid"),
                || (),
            )
            .await?;
        let mut frameworks = Vec::new();
        while let Some(row) = rows.next().await? {
            frameworks.push(row_to_framework(&row)?);
        }
        Ok(frameworks)
    }

    pub async fn update_framework(
        &self,
        id: &str,
        update: FrameworkUpdate,
    ) -> Result<Framework, DatabaseError> {
        self.ensure_exists(EntityType::Framework, id).await?;
        if update.is_empty() {
            return self.get_framework(id).await;
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref name) = update.name {
            sets.push(format!("name = ?{idx}"));
            params.push(name.clone().into());
            idx += 1;
        }
        if let Some(ref description) = update.description {
            sets.push(format!("description = ?{idx}"));
            params.push(opt_value(description.as_deref()));
            idx += 1;
        }
        if let Some(ref requirements) = update.requirements {
            sets.push(format!("requirements = ?{idx}"));
            params.push(opt_value(requirements.as_deref()));
            idx += 1;
        }
        if let Some(ref categories) = update.categories {
            sets.push(format!("categories = ?{idx}"));
            params.push(to_json(categories)?.into());
            idx += 1;
        }
        if let Some(is_active) = update.is_active {
            sets.push(format!("is_active = ?{idx}"));
            params.push(libsql::Value::Integer(i64::from(is_active)));
            idx += 1;
        }

        sets.push(format!("updated_at = ?{idx}"));
        params.push(format_datetime(&now()).into());
        idx += 1;

        params.push(id.into());
        let sql = format!("UPDATE frameworks SET {} WHERE id = ?{idx}", sets.join(", "));
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        self.record_committed_detail(EntityType::Framework, id, AuditAction::Updated, &update)
            .await?;

        self.get_framework(id).await
    }
}
