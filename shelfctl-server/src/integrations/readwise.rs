//! Readwise: token check and highlight export.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use super::{
    check_status, is_rejection, trim_base, IntegrationClient, IntegrationError, IntegrationResult,
};
use crate::models::{IntegrationKind, LibraryItemDetail};

const KIND: IntegrationKind = IntegrationKind::Readwise;

pub struct ReadwiseClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct HighlightBatch<'a> {
    highlights: Vec<ReadwiseHighlight<'a>>,
}

#[derive(Debug, Serialize)]
struct ReadwiseHighlight<'a> {
    text: &'a str,
    title: &'a str,
    source_url: &'a str,
    source_type: &'static str,
    category: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    highlighted_at: DateTime<Utc>,
}

impl ReadwiseClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: trim_base(base_url),
        }
    }

    fn auth(token: &str) -> String {
        format!("Token {token}")
    }
}

#[async_trait]
impl IntegrationClient for ReadwiseClient {
    fn kind(&self) -> IntegrationKind {
        KIND
    }

    async fn access_token(&self, token: &str) -> IntegrationResult<Option<String>> {
        let response = self
            .http
            .get(format!("{}/api/v2/auth/", self.base_url))
            .header(reqwest::header::AUTHORIZATION, Self::auth(token))
            .send()
            .await
            .map_err(IntegrationError::http(KIND))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(Some(token.to_owned())),
            status if is_rejection(status) => Ok(None),
            status => Err(IntegrationError::Status {
                integration: KIND,
                status: status.as_u16(),
            }),
        }
    }

    async fn export(
        &self,
        token: &str,
        _settings: Option<&Value>,
        items: &[LibraryItemDetail],
    ) -> IntegrationResult<usize> {
        let highlights: Vec<ReadwiseHighlight<'_>> = items
            .iter()
            .flat_map(|detail| {
                detail.highlights.iter().map(move |h| ReadwiseHighlight {
                    text: &h.highlight.quote,
                    title: &detail.item.title,
                    source_url: &detail.item.url,
                    source_type: "shelfctl",
                    category: "articles",
                    note: h.highlight.annotation.as_deref(),
                    highlighted_at: h.highlight.created_at,
                })
            })
            .collect();

        if highlights.is_empty() {
            return Ok(0);
        }
        let count = highlights.len();

        let response = self
            .http
            .post(format!("{}/api/v2/highlights/", self.base_url))
            .header(reqwest::header::AUTHORIZATION, Self::auth(token))
            .json(&HighlightBatch { highlights })
            .send()
            .await
            .map_err(IntegrationError::http(KIND))?;
        check_status(KIND, response)?;

        tracing::info!(count, "exported highlights to readwise");
        Ok(count)
    }
}
