//! Pocket: OAuth request-code exchange. Exporting is not supported.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{is_rejection, trim_base, IntegrationClient, IntegrationError, IntegrationResult};
use crate::models::{IntegrationKind, LibraryItemDetail};

const KIND: IntegrationKind = IntegrationKind::Pocket;

pub struct PocketClient {
    http: reqwest::Client,
    base_url: String,
    consumer_key: Option<String>,
}

#[derive(Serialize)]
struct AuthorizeRequest<'a> {
    consumer_key: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct AuthorizeResponse {
    access_token: String,
}

impl PocketClient {
    pub fn new(http: reqwest::Client, base_url: &str, consumer_key: Option<String>) -> Self {
        Self {
            http,
            base_url: trim_base(base_url),
            consumer_key,
        }
    }
}

#[async_trait]
impl IntegrationClient for PocketClient {
    fn kind(&self) -> IntegrationKind {
        KIND
    }

    /// Exchange the request code for an access token.
    async fn access_token(&self, code: &str) -> IntegrationResult<Option<String>> {
        let consumer_key =
            self.consumer_key
                .as_deref()
                .ok_or(IntegrationError::MissingSetting {
                    integration: KIND,
                    setting: "pocket_consumer_key",
                })?;

        let response = self
            .http
            .post(format!("{}/v3/oauth/authorize", self.base_url))
            .header("X-Accept", "application/json")
            .json(&AuthorizeRequest { consumer_key, code })
            .send()
            .await
            .map_err(IntegrationError::http(KIND))?;

        let status = response.status();
        if is_rejection(status) || status == reqwest::StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(IntegrationError::Status {
                integration: KIND,
                status: status.as_u16(),
            });
        }

        let body: AuthorizeResponse = response
            .json()
            .await
            .map_err(IntegrationError::http(KIND))?;
        Ok(Some(body.access_token))
    }

    async fn export(
        &self,
        _token: &str,
        _settings: Option<&Value>,
        _items: &[LibraryItemDetail],
    ) -> IntegrationResult<usize> {
        Err(IntegrationError::Unsupported { integration: KIND })
    }
}
