//! Request and response types.

use serde::{Deserialize, Serialize};

/// A page to save. Serialized as the `SavePageInput` GraphQL input.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePageRequest {
    pub url: String,
    pub client_request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub original_content: String,
}

impl SavePageRequest {
    /// Request with a fresh client request id and no title.
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client_request_id: uuid::Uuid::new_v4().to_string(),
            title: None,
            original_content: content.into(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPage {
    /// Normalized URL as stored
    pub url: String,
    pub client_request_id: String,
    pub library_item_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SavePageData {
    pub save_page: SaveResult,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub(crate) enum SaveResult {
    SaveSuccess(SavedPage),
    SaveError {
        #[serde(rename = "errorCodes")]
        error_codes: Vec<String>,
    },
}
