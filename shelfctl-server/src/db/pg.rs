//! Postgres-backed [`Store`]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    migrations, pool, HighlightRepo, IntegrationRepo, LabelRepo, LabelTarget, LibraryItemRepo,
    Store, StoreResult, UserRepo,
};
use crate::models::{
    Email, Highlight, Integration, IntegrationChanges, ItemFilter, Label, LabelChanges,
    LabelSelection, LibraryItem, LibraryItemDetail, NewHighlight, NewLabel, NewLibraryItem,
    Paginated, User,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = pool::create_pool_with_options(database_url, max_connections).await?;
        migrations::run(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, email: &Email, api_key: &str) -> StoreResult<User> {
        UserRepo::new(&self.pool).create(email, api_key).await
    }

    async fn find_user_by_api_key(&self, api_key: &str) -> StoreResult<Option<User>> {
        UserRepo::new(&self.pool).find_by_api_key(api_key).await
    }

    async fn list_labels(&self, uid: Uuid) -> StoreResult<Vec<Label>> {
        LabelRepo::new(&self.pool).list(uid).await
    }

    async fn create_label(&self, uid: Uuid, label: NewLabel) -> StoreResult<Label> {
        LabelRepo::new(&self.pool).create(uid, label).await
    }

    async fn update_label(
        &self,
        uid: Uuid,
        id: Uuid,
        changes: LabelChanges,
    ) -> StoreResult<Label> {
        LabelRepo::new(&self.pool).update(uid, id, changes).await
    }

    async fn delete_label(&self, uid: Uuid, id: Uuid) -> StoreResult<Label> {
        LabelRepo::new(&self.pool).delete(uid, id).await
    }

    async fn move_label(&self, uid: Uuid, id: Uuid, after: Option<Uuid>) -> StoreResult<Label> {
        LabelRepo::new(&self.pool).move_after(uid, id, after).await
    }

    async fn set_item_labels(
        &self,
        uid: Uuid,
        item_id: Uuid,
        selection: LabelSelection,
    ) -> StoreResult<Vec<Label>> {
        LabelRepo::new(&self.pool)
            .set_labels(uid, LabelTarget::LibraryItem, item_id, selection)
            .await
    }

    async fn set_highlight_labels(
        &self,
        uid: Uuid,
        highlight_id: Uuid,
        selection: LabelSelection,
    ) -> StoreResult<Vec<Label>> {
        LabelRepo::new(&self.pool)
            .set_labels(uid, LabelTarget::Highlight, highlight_id, selection)
            .await
    }

    async fn upsert_library_item(
        &self,
        uid: Uuid,
        item: NewLibraryItem,
    ) -> StoreResult<LibraryItem> {
        LibraryItemRepo::new(&self.pool).upsert(uid, item).await
    }

    async fn get_library_item(&self, uid: Uuid, id: Uuid) -> StoreResult<LibraryItemDetail> {
        LibraryItemRepo::new(&self.pool).get(uid, id).await
    }

    async fn list_library_items(
        &self,
        uid: Uuid,
        filter: ItemFilter,
    ) -> StoreResult<Paginated<LibraryItemDetail>> {
        LibraryItemRepo::new(&self.pool).list(uid, filter).await
    }

    async fn delete_library_item(&self, uid: Uuid, id: Uuid) -> StoreResult<LibraryItem> {
        LibraryItemRepo::new(&self.pool).delete(uid, id).await
    }

    async fn create_highlight(&self, uid: Uuid, highlight: NewHighlight) -> StoreResult<Highlight> {
        HighlightRepo::new(&self.pool).create(uid, highlight).await
    }

    async fn delete_highlight(&self, uid: Uuid, id: Uuid) -> StoreResult<Highlight> {
        HighlightRepo::new(&self.pool).delete(uid, id).await
    }

    async fn list_integrations(&self, uid: Uuid) -> StoreResult<Vec<Integration>> {
        IntegrationRepo::new(&self.pool).list(uid).await
    }

    async fn get_integration(&self, uid: Uuid, id: Uuid) -> StoreResult<Integration> {
        IntegrationRepo::new(&self.pool).get(uid, id).await
    }

    async fn save_integration(
        &self,
        uid: Uuid,
        changes: IntegrationChanges,
    ) -> StoreResult<Integration> {
        IntegrationRepo::new(&self.pool).save(uid, changes).await
    }

    async fn delete_integration(&self, uid: Uuid, id: Uuid) -> StoreResult<Integration> {
        IntegrationRepo::new(&self.pool).delete(uid, id).await
    }

    async fn mark_integration_synced(
        &self,
        uid: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Integration> {
        IntegrationRepo::new(&self.pool).mark_synced(uid, id, at).await
    }
}
