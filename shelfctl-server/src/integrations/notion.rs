//! Notion: token check and one page per library item.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::{
    check_status, is_rejection, trim_base, IntegrationClient, IntegrationError, IntegrationResult,
};
use crate::models::{IntegrationKind, LibraryItemDetail};

const KIND: IntegrationKind = IntegrationKind::Notion;

/// Settings key holding the database new pages are created in
pub const PARENT_DATABASE_SETTING: &str = "parentDatabaseId";

/// Notion rejects rich text longer than this
const MAX_TEXT_LEN: usize = 2000;

pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    version: String,
}

impl NotionClient {
    pub fn new(http: reqwest::Client, base_url: &str, version: &str) -> Self {
        Self {
            http,
            base_url: trim_base(base_url),
            version: version.to_owned(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .header("Notion-Version", &self.version)
    }
}

/// Page payload: title and URL properties, one quote block per highlight.
fn page_body(database_id: &str, detail: &LibraryItemDetail) -> Value {
    let children: Vec<Value> = detail
        .highlights
        .iter()
        .map(|h| {
            json!({
                "object": "block",
                "type": "quote",
                "quote": {
                    "rich_text": [{ "type": "text", "text": { "content": truncate(&h.highlight.quote) } }]
                }
            })
        })
        .collect();

    let labels: Vec<Value> = detail
        .labels
        .iter()
        .map(|l| json!({ "name": l.name }))
        .collect();

    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Title": { "title": [{ "text": { "content": truncate(&detail.item.title) } }] },
            "URL": { "url": detail.item.url },
            "Labels": { "multi_select": labels },
        },
        "children": children,
    })
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_TEXT_LEN).collect()
}

#[async_trait]
impl IntegrationClient for NotionClient {
    fn kind(&self) -> IntegrationKind {
        KIND
    }

    async fn access_token(&self, token: &str) -> IntegrationResult<Option<String>> {
        let response = self
            .request(reqwest::Method::GET, "/v1/users/me", token)
            .send()
            .await
            .map_err(IntegrationError::http(KIND))?;

        match response.status() {
            status if status.is_success() => Ok(Some(token.to_owned())),
            status if is_rejection(status) || status == StatusCode::BAD_REQUEST => Ok(None),
            status => Err(IntegrationError::Status {
                integration: KIND,
                status: status.as_u16(),
            }),
        }
    }

    /// One page per item, created in order. A failure part way leaves the
    /// earlier pages in place; the sync time is not advanced, so a retry
    /// creates them again.
    async fn export(
        &self,
        token: &str,
        settings: Option<&Value>,
        items: &[LibraryItemDetail],
    ) -> IntegrationResult<usize> {
        let database_id = settings
            .and_then(|s| s.get(PARENT_DATABASE_SETTING))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or(IntegrationError::MissingSetting {
                integration: KIND,
                setting: PARENT_DATABASE_SETTING,
            })?;

        for detail in items {
            let response = self
                .request(reqwest::Method::POST, "/v1/pages", token)
                .json(&page_body(database_id, detail))
                .send()
                .await
                .map_err(IntegrationError::http(KIND))?;
            check_status(KIND, response)?;
            tracing::debug!(item_id = %detail.item.id, "exported item to notion");
        }

        tracing::info!(count = items.len(), "exported items to notion");
        Ok(items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::fixtures::item_with_highlights;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> NotionClient {
        NotionClient::new(reqwest::Client::new(), &server.uri(), "2022-06-28")
    }

    #[tokio::test]
    async fn token_check_sends_version_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/users/me"))
            .and(header("Authorization", "Bearer secret"))
            .and(header("Notion-Version", "2022-06-28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "object": "user" })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client(&server).access_token("secret").await.unwrap();
        assert_eq!(token.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn unauthorized_token_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/users/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert_eq!(client(&server).access_token("bad").await.unwrap(), None);
    }

    #[tokio::test]
    async fn export_requires_parent_database() {
        let server = MockServer::start().await;
        let items = vec![item_with_highlights(&["q"])];

        let err = client(&server).export("t", None, &items).await.unwrap_err();
        assert!(matches!(err, IntegrationError::MissingSetting { .. }));
        assert!(err.is_caller_error());
    }

    #[tokio::test]
    async fn export_creates_page_per_item() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .and(body_partial_json(json!({
                "parent": { "database_id": "db-1" },
                "properties": { "URL": { "url": "https://example.com/post" } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "object": "page" })))
            .expect(2)
            .mount(&server)
            .await;

        let items = vec![item_with_highlights(&["a"]), item_with_highlights(&[])];
        let settings = json!({ PARENT_DATABASE_SETTING: "db-1" });
        let sent = client(&server)
            .export("t", Some(&settings), &items)
            .await
            .unwrap();
        assert_eq!(sent, 2);
    }

    #[tokio::test]
    async fn export_failure_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let settings = json!({ PARENT_DATABASE_SETTING: "db-1" });
        let err = client(&server)
            .export("t", Some(&settings), &[item_with_highlights(&[])])
            .await
            .unwrap_err();
        assert!(matches!(err, IntegrationError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn failure_part_way_keeps_earlier_pages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "object": "page" })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let settings = json!({ PARENT_DATABASE_SETTING: "db-1" });
        let items = vec![
            item_with_highlights(&[]),
            item_with_highlights(&[]),
            item_with_highlights(&[]),
        ];
        let err = client(&server)
            .export("t", Some(&settings), &items)
            .await
            .unwrap_err();
        assert!(matches!(err, IntegrationError::Status { status: 500, .. }));
    }

    #[test]
    fn long_text_is_truncated() {
        assert_eq!(truncate(&"x".repeat(3000)).len(), MAX_TEXT_LEN);
    }
}
