//! Output types shared by several operations

use async_graphql::{Json, SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::models::{
    Highlight, HighlightDetail, Integration, Label, LibraryItem, LibraryItemDetail,
};

#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "Label")]
pub struct LabelView {
    pub id: ID,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Label> for LabelView {
    fn from(label: Label) -> Self {
        Self {
            id: label.id.into(),
            name: label.name,
            color: label.color,
            description: label.description,
            position: label.position,
            created_at: label.created_at,
            updated_at: label.updated_at,
        }
    }
}

pub(crate) fn label_views(labels: Vec<Label>) -> Vec<LabelView> {
    labels.into_iter().map(Into::into).collect()
}

#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "Highlight")]
pub struct HighlightView {
    pub id: ID,
    pub library_item_id: ID,
    pub quote: String,
    pub patch: Option<String>,
    pub annotation: Option<String>,
    pub labels: Vec<LabelView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HighlightView {
    pub fn new(highlight: Highlight, labels: Vec<Label>) -> Self {
        Self {
            id: highlight.id.into(),
            library_item_id: highlight.library_item_id.into(),
            quote: highlight.quote,
            patch: highlight.patch,
            annotation: highlight.annotation,
            labels: label_views(labels),
            created_at: highlight.created_at,
            updated_at: highlight.updated_at,
        }
    }
}

impl From<HighlightDetail> for HighlightView {
    fn from(detail: HighlightDetail) -> Self {
        Self::new(detail.highlight, detail.labels)
    }
}

#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "LibraryItem")]
pub struct LibraryItemView {
    pub id: ID,
    pub url: String,
    pub title: String,
    pub content: String,
    pub word_count: i32,
    pub labels: Vec<LabelView>,
    pub highlights: Vec<HighlightView>,
    pub saved_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LibraryItemDetail> for LibraryItemView {
    fn from(detail: LibraryItemDetail) -> Self {
        let LibraryItem {
            id,
            url,
            title,
            content,
            word_count,
            saved_at,
            updated_at,
            ..
        } = detail.item;

        Self {
            id: id.into(),
            url,
            title,
            content,
            word_count,
            labels: label_views(detail.labels),
            highlights: detail.highlights.into_iter().map(Into::into).collect(),
            saved_at,
            updated_at,
        }
    }
}

/// Tokens are write-only and never leave the server.
#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "Integration")]
pub struct IntegrationView {
    pub id: ID,
    pub name: String,
    pub enabled: bool,
    pub settings: Option<Json<serde_json::Value>>,
    pub synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Integration> for IntegrationView {
    fn from(integration: Integration) -> Self {
        Self {
            id: integration.id.into(),
            name: integration.name,
            enabled: integration.enabled,
            settings: integration.settings.map(Json),
            synced_at: integration.synced_at,
            created_at: integration.created_at,
            updated_at: integration.updated_at,
        }
    }
}
