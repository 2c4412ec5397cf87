//! Saved pages

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::FromRow;
use url::Url;
use uuid::Uuid;

use super::{HighlightDetail, Label, Pagination, ValidationError};

/// Maximum length for stored titles
const MAX_TITLE_LEN: usize = 512;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("invalid title regex"));

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("invalid tag regex"));

/// Library item record from the store
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LibraryItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub title: String,
    pub content: String,
    pub word_count: i32,
    pub saved_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A library item with its labels and highlights
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryItemDetail {
    pub item: LibraryItem,
    pub labels: Vec<Label>,
    pub highlights: Vec<HighlightDetail>,
}

/// Absolute http(s) URL of a saved page, without fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl(Url);

impl PageUrl {
    /// Parse and normalize a page URL.
    ///
    /// ```
    /// use shelfctl_server::models::PageUrl;
    ///
    /// let url = PageUrl::parse("https://example.com/post#comments").unwrap();
    /// assert_eq!(url.as_str(), "https://example.com/post");
    /// assert!(PageUrl::parse("ftp://example.com").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "url" });
        }

        let mut url = Url::parse(trimmed).map_err(|_| ValidationError::InvalidFormat {
            field: "url",
            reason: "must be an absolute URL",
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidFormat {
                field: "url",
                reason: "must use http or https",
            });
        }

        url.set_fragment(None);
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A page to insert or refresh, keyed by (user, url)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLibraryItem {
    pub url: PageUrl,
    pub title: String,
    pub content: String,
    pub word_count: i32,
}

impl NewLibraryItem {
    /// Build from raw page input, deriving title and word count from the content.
    pub fn from_page(url: PageUrl, title: Option<&str>, content: String) -> Self {
        let title = title
            .map(collapse_whitespace)
            .filter(|t| !t.is_empty())
            .or_else(|| extract_title(&content))
            .unwrap_or_else(|| url.as_str().to_owned());
        let title = truncate_chars(&title, MAX_TITLE_LEN);
        let word_count = i32::try_from(word_count(&content)).unwrap_or(i32::MAX);

        Self {
            url,
            title,
            content,
            word_count,
        }
    }
}

/// Filter for listing library items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub page: Pagination,
    /// Only items updated strictly after this instant
    pub updated_since: Option<DateTime<Utc>>,
}

/// Text of the first `<title>` element, whitespace collapsed.
pub fn extract_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .map(|caps| collapse_whitespace(&caps[1]))
        .filter(|t| !t.is_empty())
}

/// Number of whitespace-separated words with markup removed.
pub fn word_count(content: &str) -> usize {
    TAG_RE.replace_all(content, " ").split_whitespace().count()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_requires_http() {
        assert!(PageUrl::parse("https://example.com").is_ok());
        assert!(PageUrl::parse("http://example.com/a?b=c").is_ok());
        assert!(matches!(
            PageUrl::parse("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(matches!(
            PageUrl::parse("not a url").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            PageUrl::parse("javascript:alert(1)").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }

    #[test]
    fn title_from_markup() {
        let html = "<html><head><TITLE>\n  Rust   Ownership\n</TITLE></head><body>x</body></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Rust Ownership"));
        assert_eq!(extract_title("<title>   </title>"), None);
        assert_eq!(extract_title("plain text"), None);
    }

    #[test]
    fn counts_words_without_tags() {
        assert_eq!(word_count("<p>Hello <b>brave</b> new</p><p>world</p>"), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn page_title_fallbacks() {
        let url = PageUrl::parse("https://example.com/a").unwrap();

        let explicit = NewLibraryItem::from_page(url.clone(), Some(" Given "), "<title>Doc</title>".into());
        assert_eq!(explicit.title, "Given");

        let from_content = NewLibraryItem::from_page(url.clone(), None, "<title>Doc</title> one two".into());
        assert_eq!(from_content.title, "Doc");
        assert_eq!(from_content.word_count, 3);

        let from_url = NewLibraryItem::from_page(url, Some("  "), "no markup".into());
        assert_eq!(from_url.title, "https://example.com/a");
    }
}
