//! Saving and reading pages

use uuid::Uuid;

use crate::db::Store;
use crate::error::ServiceResult;
use crate::models::{
    ItemFilter, LibraryItem, LibraryItemDetail, NewLibraryItem, PageUrl, Paginated, Pagination,
};

#[derive(Debug, Clone)]
pub struct SavePageInput {
    pub url: String,
    /// Opaque id chosen by the client, echoed back
    pub client_request_id: String,
    pub title: Option<String>,
    pub original_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPage {
    pub url: String,
    pub client_request_id: String,
    pub library_item_id: Uuid,
}

/// Save a page, refreshing the existing item when the URL was saved before.
pub async fn save_page(
    store: &dyn Store,
    uid: Uuid,
    input: SavePageInput,
) -> ServiceResult<SavedPage> {
    let url = PageUrl::parse(&input.url)?;
    let page = NewLibraryItem::from_page(url, input.title.as_deref(), input.original_content);

    let item = store.upsert_library_item(uid, page).await?;
    tracing::info!(
        library_item_id = %item.id,
        word_count = item.word_count,
        client_request_id = %input.client_request_id,
        "page saved"
    );

    Ok(SavedPage {
        url: item.url,
        client_request_id: input.client_request_id,
        library_item_id: item.id,
    })
}

pub async fn library_item(
    store: &dyn Store,
    uid: Uuid,
    id: Uuid,
) -> ServiceResult<LibraryItemDetail> {
    Ok(store.get_library_item(uid, id).await?)
}

pub async fn library_items(
    store: &dyn Store,
    uid: Uuid,
    page: Pagination,
) -> ServiceResult<Paginated<LibraryItemDetail>> {
    let filter = ItemFilter {
        page,
        updated_since: None,
    };
    Ok(store.list_library_items(uid, filter).await?)
}

pub async fn delete_library_item(
    store: &dyn Store,
    uid: Uuid,
    id: Uuid,
) -> ServiceResult<LibraryItem> {
    let deleted = store.delete_library_item(uid, id).await?;
    tracing::info!(library_item_id = %id, "library item deleted");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::test_support::{other_user, store_with_user};

    fn input(url: &str, content: &str) -> SavePageInput {
        SavePageInput {
            url: url.into(),
            client_request_id: "client-1".into(),
            title: None,
            original_content: content.into(),
        }
    }

    #[tokio::test]
    async fn save_derives_title_and_word_count() {
        let (store, uid) = store_with_user().await;
        let saved = save_page(
            &store,
            uid,
            input(
                "https://example.com/post#top",
                "<html><title> Hello  there </title><p>one two three</p></html>",
            ),
        )
        .await
        .unwrap();

        assert_eq!(saved.url, "https://example.com/post");
        assert_eq!(saved.client_request_id, "client-1");

        let detail = library_item(&store, uid, saved.library_item_id).await.unwrap();
        assert_eq!(detail.item.title, "Hello there");
        assert_eq!(detail.item.word_count, 5);
    }

    #[tokio::test]
    async fn title_falls_back_to_url() {
        let (store, uid) = store_with_user().await;
        let saved = save_page(&store, uid, input("https://example.com/x", "no title"))
            .await
            .unwrap();
        let detail = library_item(&store, uid, saved.library_item_id).await.unwrap();
        assert_eq!(detail.item.title, "https://example.com/x");
    }

    #[tokio::test]
    async fn explicit_title_wins() {
        let (store, uid) = store_with_user().await;
        let mut page = input("https://example.com/x", "<title>From page</title>");
        page.title = Some("Mine".into());
        let saved = save_page(&store, uid, page).await.unwrap();
        let detail = library_item(&store, uid, saved.library_item_id).await.unwrap();
        assert_eq!(detail.item.title, "Mine");
    }

    #[tokio::test]
    async fn saving_twice_keeps_one_item() {
        let (store, uid) = store_with_user().await;
        let first = save_page(&store, uid, input("https://example.com/a", "v1"))
            .await
            .unwrap();
        let second = save_page(&store, uid, input("https://example.com/a", "v2 updated"))
            .await
            .unwrap();
        assert_eq!(first.library_item_id, second.library_item_id);

        let page = library_items(&store, uid, Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].item.content, "v2 updated");
    }

    #[tokio::test]
    async fn invalid_url_is_bad_request() {
        let (store, uid) = store_with_user().await;
        let err = save_page(&store, uid, input("not a url", "x")).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadRequest));
    }

    #[tokio::test]
    async fn unknown_and_foreign_items_are_not_found() {
        let (store, uid) = store_with_user().await;
        let other = other_user(&store).await;
        let saved = save_page(&store, uid, input("https://example.com/a", "x"))
            .await
            .unwrap();

        let err = library_item(&store, uid, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
        let err = library_item(&store, other, saved.library_item_id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
        let err = delete_library_item(&store, other, saved.library_item_id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (store, uid) = store_with_user().await;
        let saved = save_page(&store, uid, input("https://example.com/a", "x"))
            .await
            .unwrap();
        delete_library_item(&store, uid, saved.library_item_id)
            .await
            .unwrap();
        assert!(library_item(&store, uid, saved.library_item_id).await.is_err());
    }
}
