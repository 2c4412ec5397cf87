//! Integration repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::migrations::INTEGRATION_NAME_CONSTRAINT;
use crate::db::{StoreError, StoreResult};
use crate::models::{Integration, IntegrationChanges};

use super::conflict_on;

pub struct IntegrationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> IntegrationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, uid: Uuid) -> StoreResult<Vec<Integration>> {
        let integrations =
            sqlx::query_as("SELECT * FROM integrations WHERE user_id = $1 ORDER BY created_at, id")
                .bind(uid)
                .fetch_all(self.pool)
                .await?;
        Ok(integrations)
    }

    pub async fn get(&self, uid: Uuid, id: Uuid) -> StoreResult<Integration> {
        sqlx::query_as("SELECT * FROM integrations WHERE user_id = $1 AND id = $2")
            .bind(uid)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("integration", id))
    }

    pub async fn save(&self, uid: Uuid, changes: IntegrationChanges) -> StoreResult<Integration> {
        let map_conflict =
            |e: sqlx::Error| conflict_on(e, INTEGRATION_NAME_CONSTRAINT, "integration", "name");

        match changes.id {
            None => sqlx::query_as(
                r#"
                INSERT INTO integrations (user_id, name, token, enabled, settings)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(uid)
            .bind(changes.kind.as_str())
            .bind(&changes.token)
            .bind(changes.enabled)
            .bind(&changes.settings)
            .fetch_one(self.pool)
            .await
            .map_err(map_conflict),

            Some(id) => sqlx::query_as(
                r#"
                UPDATE integrations
                SET name = $3, token = $4, enabled = $5, settings = $6, updated_at = NOW()
                WHERE user_id = $1 AND id = $2
                RETURNING *
                "#,
            )
            .bind(uid)
            .bind(id)
            .bind(changes.kind.as_str())
            .bind(&changes.token)
            .bind(changes.enabled)
            .bind(&changes.settings)
            .fetch_optional(self.pool)
            .await
            .map_err(map_conflict)?
            .ok_or_else(|| StoreError::not_found("integration", id)),
        }
    }

    pub async fn delete(&self, uid: Uuid, id: Uuid) -> StoreResult<Integration> {
        sqlx::query_as("DELETE FROM integrations WHERE user_id = $1 AND id = $2 RETURNING *")
            .bind(uid)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("integration", id))
    }

    pub async fn mark_synced(
        &self,
        uid: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Integration> {
        sqlx::query_as(
            r#"
            UPDATE integrations SET synced_at = $3, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(uid)
        .bind(id)
        .bind(at)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("integration", id))
    }
}
