//! Third-party sync providers behind one client interface.
//!
//! Clients are looked up by [`IntegrationKind`] in an [`IntegrationRegistry`]
//! built from the `[integrations]` config section. Tests register fakes.

pub mod notion;
pub mod pocket;
pub mod readwise;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use shelfctl_core::config::IntegrationsConfig;

use crate::models::{IntegrationKind, LibraryItemDetail};

pub use notion::NotionClient;
pub use pocket::PocketClient;
pub use readwise::ReadwiseClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("request to {integration} failed: {source}")]
    Http {
        integration: IntegrationKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("{integration} responded with status {status}")]
    Status {
        integration: IntegrationKind,
        status: u16,
    },

    #[error("{integration} does not support exporting")]
    Unsupported { integration: IntegrationKind },

    #[error("{integration} integration requires the '{setting}' setting")]
    MissingSetting {
        integration: IntegrationKind,
        setting: &'static str,
    },

    #[error("failed to build HTTP client: {0}")]
    Setup(#[source] reqwest::Error),
}

impl IntegrationError {
    /// True when the caller configured something wrong rather than the
    /// provider failing.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Unsupported { .. } | Self::MissingSetting { .. })
    }

    fn http(integration: IntegrationKind) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Http {
            integration,
            source,
        }
    }
}

pub type IntegrationResult<T> = Result<T, IntegrationError>;

#[async_trait]
pub trait IntegrationClient: Send + Sync {
    fn kind(&self) -> IntegrationKind;

    /// Validate (or exchange) a user-supplied token.
    /// `Ok(None)` when the provider rejects it.
    async fn access_token(&self, token: &str) -> IntegrationResult<Option<String>>;

    /// Push items and their highlights. Returns how many records were sent.
    ///
    /// Delivery is at-least-once: records accepted before an error stay with
    /// the provider and are sent again by the next export.
    async fn export(
        &self,
        token: &str,
        settings: Option<&Value>,
        items: &[LibraryItemDetail],
    ) -> IntegrationResult<usize>;
}

#[derive(Clone, Default)]
pub struct IntegrationRegistry {
    clients: HashMap<IntegrationKind, Arc<dyn IntegrationClient>>,
}

impl IntegrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in Pocket, Readwise and Notion clients.
    pub fn from_config(config: &IntegrationsConfig) -> IntegrationResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("shelfctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(IntegrationError::Setup)?;

        let mut registry = Self::new();
        registry.register(Arc::new(ReadwiseClient::new(
            http.clone(),
            &config.readwise_base_url,
        )));
        registry.register(Arc::new(NotionClient::new(
            http.clone(),
            &config.notion_base_url,
            &config.notion_version,
        )));
        registry.register(Arc::new(PocketClient::new(
            http,
            &config.pocket_base_url,
            config.pocket_consumer_key.clone(),
        )));
        Ok(registry)
    }

    /// Add a client, replacing any client of the same kind.
    pub fn register(&mut self, client: Arc<dyn IntegrationClient>) {
        self.clients.insert(client.kind(), client);
    }

    pub fn client(&self, kind: IntegrationKind) -> Option<Arc<dyn IntegrationClient>> {
        self.clients.get(&kind).cloned()
    }
}

/// Turn a non-success response into `IntegrationError::Status`.
fn check_status(
    integration: IntegrationKind,
    response: reqwest::Response,
) -> IntegrationResult<reqwest::Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(IntegrationError::Status {
            integration,
            status: response.status().as_u16(),
        })
    }
}

fn is_rejection(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_owned()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::{Highlight, HighlightDetail, LibraryItem, LibraryItemDetail};

    pub fn item_with_highlights(quotes: &[&str]) -> LibraryItemDetail {
        let now = Utc::now();
        let item = LibraryItem {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            url: "https://example.com/post".into(),
            title: "A post".into(),
            content: "<p>body</p>".into(),
            word_count: 1,
            saved_at: now,
            updated_at: now,
        };
        let highlights = quotes
            .iter()
            .map(|quote| HighlightDetail {
                highlight: Highlight {
                    id: Uuid::new_v4(),
                    user_id: item.user_id,
                    library_item_id: item.id,
                    quote: (*quote).to_owned(),
                    patch: None,
                    annotation: Some("note".into()),
                    created_at: now,
                    updated_at: now,
                },
                labels: vec![],
            })
            .collect();
        LibraryItemDetail {
            item,
            labels: vec![],
            highlights,
        }
    }
}
