//! Label repository
//!
//! Positions are dense per user. Every statement that changes them runs in a
//! transaction holding the user row lock; the `(user_id, position)` unique
//! constraint is deferred to commit so bulk shifts never trip over themselves.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::db::migrations::LABEL_NAME_INDEX;
use crate::db::{StoreError, StoreResult};
use crate::models::{Label, LabelChanges, LabelSelection, MovePlan, NewLabel};

use super::{conflict_on, dedup_ids, lock_user};

/// What a label set is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTarget {
    LibraryItem,
    Highlight,
}

impl LabelTarget {
    fn owner_table(self) -> &'static str {
        match self {
            Self::LibraryItem => "library_items",
            Self::Highlight => "highlights",
        }
    }

    fn join_table(self) -> &'static str {
        match self {
            Self::LibraryItem => "library_item_labels",
            Self::Highlight => "highlight_labels",
        }
    }

    fn join_column(self) -> &'static str {
        match self {
            Self::LibraryItem => "library_item_id",
            Self::Highlight => "highlight_id",
        }
    }

    fn resource(self) -> &'static str {
        match self {
            Self::LibraryItem => "library item",
            Self::Highlight => "highlight",
        }
    }
}

pub struct LabelRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> LabelRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, uid: Uuid) -> StoreResult<Vec<Label>> {
        let labels = sqlx::query_as("SELECT * FROM labels WHERE user_id = $1 ORDER BY position")
            .bind(uid)
            .fetch_all(self.pool)
            .await?;
        Ok(labels)
    }

    pub async fn create(&self, uid: Uuid, label: NewLabel) -> StoreResult<Label> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, uid).await?;
        let created = insert_label(&mut tx, uid, &label).await?;
        tx.commit().await?;

        tracing::debug!(label_id = %created.id, position = created.position, "label created");
        Ok(created)
    }

    pub async fn update(&self, uid: Uuid, id: Uuid, changes: LabelChanges) -> StoreResult<Label> {
        sqlx::query_as(
            r#"
            UPDATE labels
            SET name = $3, color = $4, description = $5, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(uid)
        .bind(id)
        .bind(changes.name.as_str())
        .bind(changes.color.as_str())
        .bind(changes.description.as_ref().map(|d| d.as_str()))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on(e, LABEL_NAME_INDEX, "label", "name"))?
        .ok_or_else(|| StoreError::not_found("label", id))
    }

    /// Delete a label and close the gap it leaves. Join rows go with it
    /// through `ON DELETE CASCADE`; items and highlights stay.
    pub async fn delete(&self, uid: Uuid, id: Uuid) -> StoreResult<Label> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, uid).await?;

        let deleted: Label =
            sqlx::query_as("DELETE FROM labels WHERE user_id = $1 AND id = $2 RETURNING *")
                .bind(uid)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| StoreError::not_found("label", id))?;

        sqlx::query(
            "UPDATE labels SET position = position - 1 WHERE user_id = $1 AND position > $2",
        )
        .bind(uid)
        .bind(deleted.position)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(deleted)
    }

    /// Move a label to just after `after`, or to the top.
    pub async fn move_after(&self, uid: Uuid, id: Uuid, after: Option<Uuid>) -> StoreResult<Label> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, uid).await?;

        let label = fetch_label(&mut tx, uid, id).await?;
        let after_position = match after {
            Some(after_id) if after_id == id => Some(label.position),
            Some(after_id) => Some(fetch_label(&mut tx, uid, after_id).await?.position),
            None => None,
        };

        let plan = MovePlan::new(label.position, after_position);
        if plan.is_noop() {
            tx.commit().await?;
            return Ok(label);
        }

        if let Some((range, delta)) = plan.shift() {
            sqlx::query(
                r#"
                UPDATE labels SET position = position + $4
                WHERE user_id = $1 AND position BETWEEN $2 AND $3
                "#,
            )
            .bind(uid)
            .bind(*range.start())
            .bind(*range.end())
            .bind(delta)
            .execute(&mut *tx)
            .await?;
        }

        let moved: Label = sqlx::query_as(
            "UPDATE labels SET position = $3, updated_at = NOW() WHERE user_id = $1 AND id = $2 RETURNING *",
        )
        .bind(uid)
        .bind(id)
        .bind(plan.to)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(label_id = %id, from = plan.from, to = plan.to, "label moved");
        Ok(moved)
    }

    /// Replace the labels attached to an item or highlight.
    ///
    /// Unknown ids in `selection.ids` fail the whole operation. Labels in
    /// `selection.create` are matched by name first and created otherwise.
    pub async fn set_labels(
        &self,
        uid: Uuid,
        target: LabelTarget,
        target_id: Uuid,
        selection: LabelSelection,
    ) -> StoreResult<Vec<Label>> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, uid).await?;

        let owned: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND user_id = $2)",
            target.owner_table()
        ))
        .bind(target_id)
        .bind(uid)
        .fetch_one(&mut *tx)
        .await?;
        if !owned {
            return Err(StoreError::not_found(target.resource(), target_id));
        }

        let mut ids = dedup_ids(selection.ids);
        let found: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM labels WHERE user_id = $1 AND id = ANY($2)")
                .bind(uid)
                .bind(ids.as_slice())
                .fetch_all(&mut *tx)
                .await?;
        if let Some(missing) = ids.iter().find(|id| !found.contains(id)) {
            return Err(StoreError::not_found("label", missing));
        }

        for new_label in &selection.create {
            let label = find_or_insert_label(&mut tx, uid, new_label).await?;
            if !ids.contains(&label.id) {
                ids.push(label.id);
            }
        }

        let (join, column) = (target.join_table(), target.join_column());

        sqlx::query(&format!("DELETE FROM {join} WHERE {column} = $1"))
            .bind(target_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(&format!(
            "INSERT INTO {join} ({column}, label_id) SELECT $1, UNNEST($2::uuid[])"
        ))
        .bind(target_id)
        .bind(ids.as_slice())
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "UPDATE {} SET updated_at = NOW() WHERE id = $1",
            target.owner_table()
        ))
        .bind(target_id)
        .execute(&mut *tx)
        .await?;

        let labels: Vec<Label> = sqlx::query_as(&format!(
            r#"
            SELECT l.* FROM labels l
            JOIN {join} j ON j.label_id = l.id
            WHERE j.{column} = $1
            ORDER BY l.position
            "#
        ))
        .bind(target_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(labels)
    }
}

async fn fetch_label(conn: &mut PgConnection, uid: Uuid, id: Uuid) -> StoreResult<Label> {
    sqlx::query_as("SELECT * FROM labels WHERE user_id = $1 AND id = $2")
        .bind(uid)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("label", id))
}

/// Append a label at the end of the user's ordering. Caller holds the user lock.
async fn insert_label(conn: &mut PgConnection, uid: Uuid, label: &NewLabel) -> StoreResult<Label> {
    let position: i32 =
        sqlx::query_scalar("SELECT COALESCE(MAX(position), 0) + 1 FROM labels WHERE user_id = $1")
            .bind(uid)
            .fetch_one(&mut *conn)
            .await?;

    sqlx::query_as(
        r#"
        INSERT INTO labels (user_id, name, color, description, position)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(uid)
    .bind(label.name.as_str())
    .bind(label.color_at(position))
    .bind(label.description.as_ref().map(|d| d.as_str()))
    .bind(position)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| conflict_on(e, LABEL_NAME_INDEX, "label", "name"))
}

async fn find_or_insert_label(
    conn: &mut PgConnection,
    uid: Uuid,
    label: &NewLabel,
) -> StoreResult<Label> {
    let existing: Option<Label> =
        sqlx::query_as("SELECT * FROM labels WHERE user_id = $1 AND LOWER(name) = LOWER($2)")
            .bind(uid)
            .bind(label.name.as_str())
            .fetch_optional(&mut *conn)
            .await?;

    match existing {
        Some(existing) => Ok(existing),
        None => insert_label(conn, uid, label).await,
    }
}
