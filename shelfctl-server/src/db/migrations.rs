//! Schema migrations, run at startup. Every statement is idempotent.

use sqlx::PgPool;

use super::StoreResult;

/// Unique index backing case-insensitive label names
pub const LABEL_NAME_INDEX: &str = "idx_labels_user_name";

/// Unique constraint backing one integration per kind and user
pub const INTEGRATION_NAME_CONSTRAINT: &str = "integrations_user_id_name_key";

/// Unique constraint backing one item per URL and user
pub const ITEM_URL_CONSTRAINT: &str = "library_items_user_id_url_key";

/// Run all migrations
pub async fn run(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email TEXT NOT NULL UNIQUE,
            api_key TEXT NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Position uniqueness is checked at commit so reorders can shift in bulk
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS labels (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            description TEXT,
            position INTEGER NOT NULL CHECK (position > 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT labels_user_position_key UNIQUE (user_id, position)
                DEFERRABLE INITIALLY DEFERRED
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS library_items (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            url TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            word_count INTEGER NOT NULL DEFAULT 0,
            saved_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT library_items_user_id_url_key UNIQUE (user_id, url)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS highlights (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            library_item_id UUID NOT NULL REFERENCES library_items(id) ON DELETE CASCADE,
            quote TEXT NOT NULL,
            patch TEXT,
            annotation TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Join tables: deleting a label only removes these rows
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS library_item_labels (
            library_item_id UUID NOT NULL REFERENCES library_items(id) ON DELETE CASCADE,
            label_id UUID NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (library_item_id, label_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS highlight_labels (
            highlight_id UUID NOT NULL REFERENCES highlights(id) ON DELETE CASCADE,
            label_id UUID NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (highlight_id, label_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS integrations (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            token TEXT NOT NULL,
            enabled BOOLEAN NOT NULL DEFAULT TRUE,
            settings JSONB,
            synced_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT integrations_user_id_name_key UNIQUE (user_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> StoreResult<()> {
    sqlx::query(&format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {LABEL_NAME_INDEX} ON labels(user_id, LOWER(name))"
    ))
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_library_items_user_saved ON library_items(user_id, saved_at DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_library_items_user_updated ON library_items(user_id, updated_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_highlights_item ON highlights(library_item_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_item_labels_label ON library_item_labels(label_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_highlight_labels_label ON highlight_labels(label_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
