//! The storage seam between services and persistence.
//!
//! Every method is one unit of work: implementations run it inside a single
//! transaction (Postgres) or a single write lock (memory). All methods are
//! scoped to the calling user; rows owned by someone else are reported as
//! `NotFound`, exactly like missing rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Email, Highlight, Integration, IntegrationChanges, ItemFilter, Label, LabelChanges,
    LabelSelection, LibraryItem, LibraryItemDetail, NewHighlight, NewLabel, NewLibraryItem,
    Paginated, User,
};

/// Storage error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {resource} with this {field} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
    },
}

impl StoreError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    // Users

    async fn create_user(&self, email: &Email, api_key: &str) -> StoreResult<User>;

    async fn find_user_by_api_key(&self, api_key: &str) -> StoreResult<Option<User>>;

    // Labels

    /// All labels of the user ordered by position
    async fn list_labels(&self, uid: Uuid) -> StoreResult<Vec<Label>>;

    /// Append a label at the end of the user's ordering.
    /// `Conflict` when the name is taken (case-insensitive).
    async fn create_label(&self, uid: Uuid, label: NewLabel) -> StoreResult<Label>;

    async fn update_label(&self, uid: Uuid, id: Uuid, changes: LabelChanges)
        -> StoreResult<Label>;

    /// Remove a label, its item/highlight associations, and close the position gap.
    async fn delete_label(&self, uid: Uuid, id: Uuid) -> StoreResult<Label>;

    /// Move a label after `after` (or to the top) and renumber the labels in between.
    async fn move_label(&self, uid: Uuid, id: Uuid, after: Option<Uuid>) -> StoreResult<Label>;

    /// Replace the label set of a library item. Returns the new set by position.
    async fn set_item_labels(
        &self,
        uid: Uuid,
        item_id: Uuid,
        selection: LabelSelection,
    ) -> StoreResult<Vec<Label>>;

    /// Replace the label set of a highlight. Returns the new set by position.
    async fn set_highlight_labels(
        &self,
        uid: Uuid,
        highlight_id: Uuid,
        selection: LabelSelection,
    ) -> StoreResult<Vec<Label>>;

    // Library items

    /// Insert a page, or refresh the existing item with the same URL.
    async fn upsert_library_item(&self, uid: Uuid, item: NewLibraryItem)
        -> StoreResult<LibraryItem>;

    async fn get_library_item(&self, uid: Uuid, id: Uuid) -> StoreResult<LibraryItemDetail>;

    /// Newest first
    async fn list_library_items(
        &self,
        uid: Uuid,
        filter: ItemFilter,
    ) -> StoreResult<Paginated<LibraryItemDetail>>;

    async fn delete_library_item(&self, uid: Uuid, id: Uuid) -> StoreResult<LibraryItem>;

    // Highlights

    async fn create_highlight(&self, uid: Uuid, highlight: NewHighlight) -> StoreResult<Highlight>;

    async fn delete_highlight(&self, uid: Uuid, id: Uuid) -> StoreResult<Highlight>;

    // Integrations

    async fn list_integrations(&self, uid: Uuid) -> StoreResult<Vec<Integration>>;

    async fn get_integration(&self, uid: Uuid, id: Uuid) -> StoreResult<Integration>;

    /// Insert when `changes.id` is `None` (`Conflict` on a second integration
    /// of the same kind), update otherwise.
    async fn save_integration(
        &self,
        uid: Uuid,
        changes: IntegrationChanges,
    ) -> StoreResult<Integration>;

    async fn delete_integration(&self, uid: Uuid, id: Uuid) -> StoreResult<Integration>;

    async fn mark_integration_synced(
        &self,
        uid: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Integration>;
}
