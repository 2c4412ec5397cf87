//! GraphQL endpoint

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::http::extractors::MaybeClaims;
use crate::http::server::HttpState;

pub const GRAPHQL_PATH: &str = "/api/graphql";

/// POST /api/graphql
async fn execute(
    State(state): State<HttpState>,
    MaybeClaims(claims): MaybeClaims,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let Some(claims) = claims {
        request = request.data(claims);
    }
    state.schema.execute(request).await.into()
}

/// GET /api/graphql
async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

pub fn router() -> Router<HttpState> {
    Router::new().route(GRAPHQL_PATH, get(graphiql).post(execute))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::db::MemoryStore;
    use crate::http::build_router;
    use crate::integrations::IntegrationRegistry;
    use crate::services::users::create_user;
    use crate::state::AppState;

    async fn setup() -> (axum::Router, String) {
        let store = Arc::new(MemoryStore::new());
        let user = create_user(store.as_ref(), "reader@example.com")
            .await
            .unwrap();
        let state = AppState::new(store, IntegrationRegistry::new());
        (build_router(state, false), user.api_key)
    }

    fn post(query: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/graphql")
            .header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder
            .body(Body::from(json!({ "query": query }).to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    const SAVE: &str = r#"mutation {
        savePage(input: { url: "https://example.com/a", clientRequestId: "r1", originalContent: "hi" }) {
            __typename
            ... on SaveSuccess { clientRequestId }
            ... on SaveError { errorCodes }
        }
    }"#;

    #[tokio::test]
    async fn bearer_key_identifies_caller() {
        let (app, key) = setup().await;
        let response = app
            .oneshot(post(SAVE, Some(&format!("Bearer {key}"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["savePage"]["__typename"], "SaveSuccess");
        assert_eq!(body["data"]["savePage"]["clientRequestId"], "r1");
    }

    #[tokio::test]
    async fn missing_or_unknown_key_is_unauthorized() {
        let (app, _) = setup().await;

        for auth in [None, Some("Bearer shelf_unknown")] {
            let response = app.clone().oneshot(post(SAVE, auth)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = json_body(response).await;
            assert_eq!(body["data"]["savePage"]["errorCodes"][0], "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn malformed_authorization_is_400() {
        let (app, _) = setup().await;
        let response = app.oneshot(post(SAVE, Some("Token abc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn graphiql_is_served() {
        let (app, _) = setup().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/graphql")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("graphiql"));
    }
}
