//! Highlights anchored in library items

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Label, ValidationError};

/// Maximum length for highlight quotes
const MAX_QUOTE_LEN: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Highlight {
    pub id: Uuid,
    pub user_id: Uuid,
    pub library_item_id: Uuid,
    pub quote: String,
    /// Location of the quote inside the item content (opaque to the server)
    pub patch: Option<String>,
    pub annotation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightDetail {
    pub highlight: Highlight,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHighlight {
    pub library_item_id: Uuid,
    pub quote: String,
    pub patch: Option<String>,
    pub annotation: Option<String>,
}

impl NewHighlight {
    pub fn new(
        library_item_id: Uuid,
        quote: &str,
        patch: Option<String>,
        annotation: Option<String>,
    ) -> Result<Self, ValidationError> {
        let quote = quote.trim();
        if quote.is_empty() {
            return Err(ValidationError::Empty { field: "quote" });
        }
        if quote.chars().count() > MAX_QUOTE_LEN {
            return Err(ValidationError::TooLong {
                field: "quote",
                max: MAX_QUOTE_LEN,
            });
        }

        Ok(Self {
            library_item_id,
            quote: quote.to_owned(),
            patch: patch.filter(|p| !p.is_empty()),
            annotation: annotation
                .map(|a| a.trim().to_owned())
                .filter(|a| !a.is_empty()),
        })
    }
}
