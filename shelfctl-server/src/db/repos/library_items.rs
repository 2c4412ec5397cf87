//! Library item repository

use std::collections::HashMap;

use sqlx::{FromRow, PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::db::{StoreError, StoreResult};
use crate::models::{
    Highlight, HighlightDetail, ItemFilter, Label, LibraryItem, LibraryItemDetail, NewLibraryItem,
    Paginated,
};

pub struct LibraryItemRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> LibraryItemRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a page, or refresh content and timestamps of the item already
    /// saved under the same URL. Labels and highlights are kept.
    pub async fn upsert(&self, uid: Uuid, item: NewLibraryItem) -> StoreResult<LibraryItem> {
        let saved = sqlx::query_as(
            r#"
            INSERT INTO library_items (user_id, url, title, content, word_count)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, url) DO UPDATE
            SET title = EXCLUDED.title,
                content = EXCLUDED.content,
                word_count = EXCLUDED.word_count,
                saved_at = NOW(),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(uid)
        .bind(item.url.as_str())
        .bind(&item.title)
        .bind(&item.content)
        .bind(item.word_count)
        .fetch_one(self.pool)
        .await?;
        Ok(saved)
    }

    pub async fn get(&self, uid: Uuid, id: Uuid) -> StoreResult<LibraryItemDetail> {
        let mut conn = self.pool.acquire().await?;

        let item: LibraryItem =
            sqlx::query_as("SELECT * FROM library_items WHERE user_id = $1 AND id = $2")
                .bind(uid)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| StoreError::not_found("library item", id))?;

        let mut details = load_details(&mut conn, vec![item]).await?;
        details
            .pop()
            .ok_or_else(|| StoreError::not_found("library item", id))
    }

    /// Newest first, with total count via window function
    pub async fn list(
        &self,
        uid: Uuid,
        filter: ItemFilter,
    ) -> StoreResult<Paginated<LibraryItemDetail>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query(
            r#"
            SELECT *, COUNT(*) OVER() AS total
            FROM library_items
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR updated_at > $2)
            ORDER BY saved_at DESC, id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(uid)
        .bind(filter.updated_since)
        .bind(i64::from(filter.page.limit()))
        .bind(filter.page.offset() as i64)
        .fetch_all(&mut *conn)
        .await?;

        if rows.is_empty() {
            // Past the last page the window count is unavailable
            if filter.page.page > 1 {
                let total: i64 = sqlx::query_scalar(
                    r#"
                    SELECT COUNT(*) FROM library_items
                    WHERE user_id = $1 AND ($2::timestamptz IS NULL OR updated_at > $2)
                    "#,
                )
                .bind(uid)
                .bind(filter.updated_since)
                .fetch_one(&mut *conn)
                .await?;
                let mut page = Paginated::empty(filter.page);
                page.total = total;
                return Ok(page);
            }
            return Ok(Paginated::empty(filter.page));
        }

        let total: i64 = rows[0].try_get("total")?;
        let items = rows
            .iter()
            .map(|row| LibraryItem::from_row(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated {
            items: load_details(&mut conn, items).await?,
            total,
            page: filter.page.page,
            per_page: filter.page.per_page,
        })
    }

    /// Delete an item with its highlights and label associations.
    pub async fn delete(&self, uid: Uuid, id: Uuid) -> StoreResult<LibraryItem> {
        sqlx::query_as("DELETE FROM library_items WHERE user_id = $1 AND id = $2 RETURNING *")
            .bind(uid)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("library item", id))
    }
}

/// Attach labels and highlights (with their labels) to items.
/// Three queries regardless of how many items are passed.
async fn load_details(
    conn: &mut PgConnection,
    items: Vec<LibraryItem>,
) -> StoreResult<Vec<LibraryItemDetail>> {
    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();

    let label_rows = sqlx::query(
        r#"
        SELECT j.library_item_id, l.*
        FROM library_item_labels j
        JOIN labels l ON l.id = j.label_id
        WHERE j.library_item_id = ANY($1)
        ORDER BY l.position
        "#,
    )
    .bind(item_ids.as_slice())
    .fetch_all(&mut *conn)
    .await?;

    let mut item_labels: HashMap<Uuid, Vec<Label>> = HashMap::new();
    for row in &label_rows {
        let item_id: Uuid = row.try_get("library_item_id")?;
        item_labels
            .entry(item_id)
            .or_default()
            .push(Label::from_row(row)?);
    }

    let highlights: Vec<Highlight> = sqlx::query_as(
        "SELECT * FROM highlights WHERE library_item_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(item_ids.as_slice())
    .fetch_all(&mut *conn)
    .await?;

    let highlight_ids: Vec<Uuid> = highlights.iter().map(|h| h.id).collect();
    let mut highlight_labels: HashMap<Uuid, Vec<Label>> = HashMap::new();
    if !highlight_ids.is_empty() {
        let rows = sqlx::query(
            r#"
            SELECT j.highlight_id, l.*
            FROM highlight_labels j
            JOIN labels l ON l.id = j.label_id
            WHERE j.highlight_id = ANY($1)
            ORDER BY l.position
            "#,
        )
        .bind(highlight_ids.as_slice())
        .fetch_all(&mut *conn)
        .await?;

        for row in &rows {
            let highlight_id: Uuid = row.try_get("highlight_id")?;
            highlight_labels
                .entry(highlight_id)
                .or_default()
                .push(Label::from_row(row)?);
        }
    }

    let mut item_highlights: HashMap<Uuid, Vec<HighlightDetail>> = HashMap::new();
    for highlight in highlights {
        let labels = highlight_labels.remove(&highlight.id).unwrap_or_default();
        item_highlights
            .entry(highlight.library_item_id)
            .or_default()
            .push(HighlightDetail { highlight, labels });
    }

    Ok(items
        .into_iter()
        .map(|item| LibraryItemDetail {
            labels: item_labels.remove(&item.id).unwrap_or_default(),
            highlights: item_highlights.remove(&item.id).unwrap_or_default(),
            item,
        })
        .collect())
}
