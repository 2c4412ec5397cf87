//! Library item queries plus the savePage mutation

use async_graphql::{Context, InputObject, Object, SimpleObject, ID};

use super::types::LibraryItemView;
use super::{app_state, authorized, parse_id, respond};
use crate::models::Pagination;
use crate::services::library_items as service;

op_result!(LibraryItemResult, LibraryItemSuccess, LibraryItemError, LibraryItemErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
});

op_result!(LibraryItemsResult, LibraryItemsSuccess, LibraryItemsError, LibraryItemsErrorCode {
    Unauthorized,
    BadRequest,
});

op_result!(SaveResult, SaveSuccess, SaveError, SaveErrorCode {
    Unauthorized,
    BadRequest,
});

op_result!(DeleteLibraryItemResult, DeleteLibraryItemSuccess, DeleteLibraryItemError, DeleteLibraryItemErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
});

#[derive(SimpleObject, Debug)]
pub struct LibraryItemSuccess {
    pub item: LibraryItemView,
}

#[derive(SimpleObject, Debug)]
pub struct LibraryItemsSuccess {
    pub items: Vec<LibraryItemView>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub has_next_page: bool,
}

#[derive(SimpleObject, Debug)]
pub struct SaveSuccess {
    pub url: String,
    pub client_request_id: String,
    pub library_item_id: ID,
}

#[derive(SimpleObject, Debug)]
pub struct DeleteLibraryItemSuccess {
    pub id: ID,
}

#[derive(InputObject, Debug)]
pub struct SavePageInput {
    pub url: String,
    /// Echoed back so clients can match responses to requests
    pub client_request_id: String,
    pub title: Option<String>,
    pub original_content: String,
}

impl From<SavePageInput> for service::SavePageInput {
    fn from(input: SavePageInput) -> Self {
        Self {
            url: input.url,
            client_request_id: input.client_request_id,
            title: input.title,
            original_content: input.original_content,
        }
    }
}

#[derive(Default)]
pub struct LibraryItemQuery;

#[Object]
impl LibraryItemQuery {
    async fn library_item(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<LibraryItemResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let id = parse_id(&id, "library item")?;
            service::library_item(state.store(), uid, id).await
        }
        .await;

        respond(result, |detail| {
            LibraryItemResult::LibraryItemSuccess(LibraryItemSuccess {
                item: detail.into(),
            })
        })
    }

    /// Saved items, newest first
    async fn library_items(
        &self,
        ctx: &Context<'_>,
        page: Option<i32>,
        per_page: Option<i32>,
    ) -> async_graphql::Result<LibraryItemsResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            service::library_items(state.store(), uid, Pagination::from_args(page, per_page))
                .await
        }
        .await;

        respond(result, |items| {
            let has_next_page = items.has_next();
            LibraryItemsResult::LibraryItemsSuccess(LibraryItemsSuccess {
                total: items.total,
                page: items.page,
                per_page: items.per_page,
                has_next_page,
                items: items.items.into_iter().map(Into::into).collect(),
            })
        })
    }
}

#[derive(Default)]
pub struct LibraryItemMutation;

#[Object]
impl LibraryItemMutation {
    /// Save a page, refreshing the stored copy when the URL is already saved
    async fn save_page(
        &self,
        ctx: &Context<'_>,
        input: SavePageInput,
    ) -> async_graphql::Result<SaveResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            service::save_page(state.store(), uid, input.into()).await
        }
        .await;

        respond(result, |saved| {
            SaveResult::SaveSuccess(SaveSuccess {
                url: saved.url,
                client_request_id: saved.client_request_id,
                library_item_id: saved.library_item_id.into(),
            })
        })
    }

    async fn delete_library_item(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<DeleteLibraryItemResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let id = parse_id(&id, "library item")?;
            service::delete_library_item(state.store(), uid, id).await
        }
        .await;

        respond(result, |item| {
            DeleteLibraryItemResult::DeleteLibraryItemSuccess(DeleteLibraryItemSuccess {
                id: item.id.into(),
            })
        })
    }
}
