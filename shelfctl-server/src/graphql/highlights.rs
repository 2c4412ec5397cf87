//! Highlight mutations

use async_graphql::{Context, InputObject, Object, SimpleObject, ID};

use super::types::HighlightView;
use super::{app_state, authorized, parse_id, respond};
use crate::services::highlights as service;

op_result!(CreateHighlightResult, CreateHighlightSuccess, CreateHighlightError, CreateHighlightErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
});

op_result!(DeleteHighlightResult, DeleteHighlightSuccess, DeleteHighlightError, DeleteHighlightErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
});

#[derive(SimpleObject, Debug)]
pub struct CreateHighlightSuccess {
    pub highlight: HighlightView,
}

#[derive(SimpleObject, Debug)]
pub struct DeleteHighlightSuccess {
    pub id: ID,
}

#[derive(InputObject, Debug)]
pub struct CreateHighlightInput {
    pub library_item_id: ID,
    pub quote: String,
    /// Opaque anchor produced by the client
    pub patch: Option<String>,
    pub annotation: Option<String>,
}

#[derive(Default)]
pub struct HighlightMutation;

#[Object]
impl HighlightMutation {
    async fn create_highlight(
        &self,
        ctx: &Context<'_>,
        input: CreateHighlightInput,
    ) -> async_graphql::Result<CreateHighlightResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let input = service::CreateHighlightInput {
                library_item_id: parse_id(&input.library_item_id, "library item")?,
                quote: input.quote,
                patch: input.patch,
                annotation: input.annotation,
            };
            service::create_highlight(state.store(), uid, input).await
        }
        .await;

        respond(result, |highlight| {
            CreateHighlightResult::CreateHighlightSuccess(CreateHighlightSuccess {
                highlight: HighlightView::new(highlight, Vec::new()),
            })
        })
    }

    async fn delete_highlight(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<DeleteHighlightResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let id = parse_id(&id, "highlight")?;
            service::delete_highlight(state.store(), uid, id).await
        }
        .await;

        respond(result, |highlight| {
            DeleteHighlightResult::DeleteHighlightSuccess(DeleteHighlightSuccess {
                id: highlight.id.into(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::graphql::test_support::{typename, TestSchema};

    async fn saved_item(schema: &TestSchema) -> String {
        let data = schema
            .run(
                r#"mutation {
                    savePage(input: {
                        url: "https://example.com/a",
                        clientRequestId: "r",
                        originalContent: "some text"
                    }) { ... on SaveSuccess { libraryItemId } }
                }"#,
            )
            .await;
        data["savePage"]["libraryItemId"].as_str().unwrap().to_owned()
    }

    fn create_query(item_id: &str, quote: &str) -> String {
        format!(
            r#"mutation {{
                createHighlight(input: {{ libraryItemId: "{item_id}", quote: "{quote}", annotation: "note" }}) {{
                    __typename
                    ... on CreateHighlightSuccess {{ highlight {{ id quote annotation libraryItemId }} }}
                    ... on CreateHighlightError {{ errorCodes }}
                }}
            }}"#
        )
    }

    #[tokio::test]
    async fn highlight_shows_up_on_item() {
        let schema = TestSchema::new().await;
        let item_id = saved_item(&schema).await;

        let data = schema.run(&create_query(&item_id, "some")).await;
        let created = &data["createHighlight"];
        assert_eq!(typename(created), "CreateHighlightSuccess");
        assert_eq!(created["highlight"]["libraryItemId"], item_id.as_str());
        assert_eq!(created["highlight"]["annotation"], "note");

        let query = format!(
            r#"{{ libraryItem(id: "{item_id}") {{
                ... on LibraryItemSuccess {{ item {{ highlights {{ quote }} }} }}
            }} }}"#
        );
        let data = schema.run(&query).await;
        assert_eq!(data["libraryItem"]["item"]["highlights"][0]["quote"], "some");
    }

    #[tokio::test]
    async fn empty_quote_is_bad_request() {
        let schema = TestSchema::new().await;
        let item_id = saved_item(&schema).await;

        let data = schema.run(&create_query(&item_id, "  ")).await;
        assert_eq!(data["createHighlight"]["errorCodes"][0], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let schema = TestSchema::new().await;
        let data = schema
            .run(&create_query(&uuid::Uuid::new_v4().to_string(), "q"))
            .await;
        assert_eq!(data["createHighlight"]["errorCodes"][0], "NOT_FOUND");
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let schema = TestSchema::new().await;
        let item_id = saved_item(&schema).await;
        let data = schema.run(&create_query(&item_id, "some")).await;
        let id = data["createHighlight"]["highlight"]["id"].as_str().unwrap().to_owned();

        let query = format!(
            r#"mutation {{ deleteHighlight(id: "{id}") {{
                __typename
                ... on DeleteHighlightError {{ errorCodes }}
            }} }}"#
        );
        let data = schema.run(&query).await;
        assert_eq!(typename(&data["deleteHighlight"]), "DeleteHighlightSuccess");

        let data = schema.run(&query).await;
        assert_eq!(data["deleteHighlight"]["errorCodes"][0], "NOT_FOUND");
    }
}
