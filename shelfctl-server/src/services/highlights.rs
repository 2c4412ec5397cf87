//! Highlight operations

use uuid::Uuid;

use crate::db::Store;
use crate::error::ServiceResult;
use crate::models::{Highlight, NewHighlight};

#[derive(Debug, Clone)]
pub struct CreateHighlightInput {
    pub library_item_id: Uuid,
    pub quote: String,
    pub patch: Option<String>,
    pub annotation: Option<String>,
}

pub async fn create_highlight(
    store: &dyn Store,
    uid: Uuid,
    input: CreateHighlightInput,
) -> ServiceResult<Highlight> {
    let highlight = NewHighlight::new(
        input.library_item_id,
        &input.quote,
        input.patch,
        input.annotation,
    )?;

    let created = store.create_highlight(uid, highlight).await?;
    tracing::info!(
        highlight_id = %created.id,
        library_item_id = %created.library_item_id,
        "highlight created"
    );
    Ok(created)
}

pub async fn delete_highlight(store: &dyn Store, uid: Uuid, id: Uuid) -> ServiceResult<Highlight> {
    let deleted = store.delete_highlight(uid, id).await?;
    tracing::info!(highlight_id = %id, "highlight deleted");
    Ok(deleted)
}
