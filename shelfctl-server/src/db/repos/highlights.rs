//! Highlight repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{StoreError, StoreResult};
use crate::models::{Highlight, NewHighlight};

pub struct HighlightRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> HighlightRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a highlight on one of the user's items and bump the item's
    /// `updated_at` so incremental exports pick it up.
    pub async fn create(&self, uid: Uuid, highlight: NewHighlight) -> StoreResult<Highlight> {
        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query(
            "UPDATE library_items SET updated_at = NOW() WHERE user_id = $1 AND id = $2",
        )
        .bind(uid)
        .bind(highlight.library_item_id)
        .execute(&mut *tx)
        .await?;
        if touched.rows_affected() == 0 {
            return Err(StoreError::not_found(
                "library item",
                highlight.library_item_id,
            ));
        }

        let created: Highlight = sqlx::query_as(
            r#"
            INSERT INTO highlights (user_id, library_item_id, quote, patch, annotation)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(uid)
        .bind(highlight.library_item_id)
        .bind(&highlight.quote)
        .bind(&highlight.patch)
        .bind(&highlight.annotation)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    pub async fn delete(&self, uid: Uuid, id: Uuid) -> StoreResult<Highlight> {
        sqlx::query_as("DELETE FROM highlights WHERE user_id = $1 AND id = $2 RETURNING *")
            .bind(uid)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("highlight", id))
    }
}
