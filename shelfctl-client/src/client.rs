//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use url::Url;

use crate::error::{ClientError, Result};
use crate::types::{
    GraphQlRequest, GraphQlResponse, SavePageData, SavePageRequest, SaveResult, SavedPage,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const GRAPHQL_PATH: &str = "api/graphql";

const SAVE_PAGE: &str = r#"
mutation SavePage($input: SavePageInput!) {
  savePage(input: $input) {
    __typename
    ... on SaveSuccess { url clientRequestId libraryItemId }
    ... on SaveError { errorCodes }
  }
}
"#;

/// shelfctl API client. Cheap to clone.
#[derive(Clone)]
pub struct ShelfClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl ShelfClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The GraphQL endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Save a page into the caller's library.
    pub async fn save_page(&self, request: SavePageRequest) -> Result<SavedPage> {
        tracing::debug!(url = %request.url, client_request_id = %request.client_request_id, "saving page");

        let data: SavePageData = self.execute(SAVE_PAGE, json!({ "input": request })).await?;
        match data.save_page {
            SaveResult::SaveSuccess(saved) => Ok(saved),
            SaveResult::SaveError { error_codes } => Err(ClientError::Rejected { codes: error_codes }),
        }
    }

    async fn execute<T, V>(&self, query: &str, variables: V) -> Result<T>
    where
        T: DeserializeOwned,
        V: Serialize,
    {
        let response = self
            .inner
            .http
            .post(self.inner.endpoint.clone())
            .json(&GraphQlRequest { query, variables })
            .timeout(self.inner.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let response: GraphQlResponse<T> = serde_json::from_slice(&body)?;

        if let Some(error) = response.errors.into_iter().next() {
            return Err(ClientError::GraphQl {
                message: error.message,
            });
        }
        response.data.ok_or_else(|| ClientError::GraphQl {
            message: "response carried no data".to_string(),
        })
    }
}

/// Builder for [`ShelfClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Server root, e.g. `http://127.0.0.1:3030`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ShelfClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Config("base_url is required".to_string()))?;

        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        let endpoint = base_url.join(GRAPHQL_PATH)?;

        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|_| ClientError::Config("invalid api key".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(format!("shelfctl-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Network)?;

        Ok(ShelfClient {
            inner: Arc::new(ClientInner {
                http,
                endpoint,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn endpoint_is_joined_under_base_path() {
        let client = ShelfClient::builder()
            .base_url("http://localhost:3030")
            .build()
            .unwrap();
        assert_eq!(client.endpoint().as_str(), "http://localhost:3030/api/graphql");

        let client = ShelfClient::builder()
            .base_url("https://example.com/shelf")
            .build()
            .unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://example.com/shelf/api/graphql"
        );
    }

    #[test]
    fn invalid_base_url() {
        let result = ShelfClient::builder().base_url("not a url").build();
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn api_key_with_newline_is_config_error() {
        let result = ShelfClient::builder()
            .base_url("http://localhost:3030")
            .api_key("bad\nkey")
            .build();
        assert!(matches!(result, Err(ClientError::Config(_))));
    }
}
