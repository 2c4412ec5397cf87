//! Label records and validated label fields

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::FromRow;
use uuid::Uuid;

use super::ValidationError;

/// Maximum length for label names
const MAX_LABEL_NAME_LEN: usize = 64;

/// Maximum length for label descriptions
const MAX_DESCRIPTION_LEN: usize = 255;

/// `#rgb` or `#rrggbb`
static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("invalid color regex")
});

/// Colors handed out to labels created without one, cycling by position.
const PALETTE: [&str; 8] = [
    "#ff5d99", "#7cff7b", "#ffd234", "#7be4ff", "#ce88ef", "#ef8c43", "#5f8bff", "#a0a0a0",
];

/// Label record from the store
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Label {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Label {
    /// Case-insensitive name comparison used for uniqueness.
    pub fn has_name(&self, name: &LabelName) -> bool {
        self.name.to_lowercase() == name.key()
    }
}

/// Validated label name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelName(String);

impl LabelName {
    /// Create a new label name.
    ///
    /// # Rules
    /// - Non-empty after trimming whitespace
    /// - Max 64 characters
    ///
    /// # Example
    /// ```
    /// use shelfctl_server::models::LabelName;
    ///
    /// assert_eq!(LabelName::new("  Reading ").unwrap().as_str(), "Reading");
    /// assert!(LabelName::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "label name",
            });
        }

        if trimmed.chars().count() > MAX_LABEL_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "label name",
                max: MAX_LABEL_NAME_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form, the key names are unique on.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for LabelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated label color, normalized to lowercase `#rrggbb`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelColor(String);

impl LabelColor {
    /// Parse a hex color.
    ///
    /// ```
    /// use shelfctl_server::models::LabelColor;
    ///
    /// assert_eq!(LabelColor::new("#ABC").unwrap().as_str(), "#aabbcc");
    /// assert!(LabelColor::new("red").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "label color",
            });
        }
        if !HEX_COLOR_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "label color",
                reason: "must be a hex color like #ff5d99",
            });
        }

        let hex = trimmed[1..].to_lowercase();
        let hex = if hex.len() == 3 {
            hex.chars().flat_map(|c| [c, c]).collect()
        } else {
            hex
        };
        Ok(Self(format!("#{hex}")))
    }

    /// Default color for a label created at `position`.
    pub fn for_position(position: i32) -> Self {
        let idx = (position - 1).rem_euclid(PALETTE.len() as i32) as usize;
        Self(PALETTE[idx].to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated optional label description. Blank input means "no description".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDescription(String);

impl LabelDescription {
    pub fn parse(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        let Some(trimmed) = s.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::TooLong {
                field: "label description",
                max: MAX_DESCRIPTION_LEN,
            });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A label to insert. Position is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLabel {
    pub name: LabelName,
    pub color: Option<LabelColor>,
    pub description: Option<LabelDescription>,
}

impl NewLabel {
    /// Resolve the stored color for a label landing at `position`.
    pub fn color_at(&self, position: i32) -> String {
        self.color
            .clone()
            .unwrap_or_else(|| LabelColor::for_position(position))
            .as_str()
            .to_owned()
    }
}

/// Full replacement of a label's editable fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelChanges {
    pub name: LabelName,
    pub color: LabelColor,
    pub description: Option<LabelDescription>,
}

/// The label set to attach to an item or highlight: existing ids plus
/// labels to find-or-create by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelection {
    pub ids: Vec<Uuid>,
    pub create: Vec<NewLabel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_trims_and_limits() {
        assert_eq!(LabelName::new(" news ").unwrap().as_str(), "news");
        assert!(matches!(
            LabelName::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));

        let max = "a".repeat(64);
        assert!(LabelName::new(&max).is_ok());
        let too_long = "a".repeat(65);
        assert!(matches!(
            LabelName::new(&too_long).unwrap_err(),
            ValidationError::TooLong { max: 64, .. }
        ));
    }

    #[test]
    fn name_key_is_case_insensitive() {
        let a = LabelName::new("Rust").unwrap();
        let b = LabelName::new("rUST").unwrap();
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn label_matches_name_in_any_case() {
        let now = Utc::now();
        let label = Label {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Reading List".into(),
            color: "#ff5d99".into(),
            description: None,
            position: 1,
            created_at: now,
            updated_at: now,
        };
        assert!(label.has_name(&LabelName::new(" reading list ").unwrap()));
        assert!(!label.has_name(&LabelName::new("reading").unwrap()));
    }

    #[test]
    fn color_normalizes() {
        assert_eq!(LabelColor::new("#FF5D99").unwrap().as_str(), "#ff5d99");
        assert_eq!(LabelColor::new("#0aF").unwrap().as_str(), "#00aaff");
        assert!(LabelColor::new("ff5d99").is_err());
        assert!(LabelColor::new("#ff5d9").is_err());
        assert!(LabelColor::new(" ").is_err());
    }

    #[test]
    fn default_colors_cycle() {
        assert_eq!(LabelColor::for_position(1).as_str(), PALETTE[0]);
        assert_eq!(LabelColor::for_position(9).as_str(), PALETTE[0]);
        assert_eq!(LabelColor::for_position(2).as_str(), PALETTE[1]);
        // Never panics on odd positions
        assert_eq!(LabelColor::for_position(0).as_str(), PALETTE[7]);
    }

    #[test]
    fn description_blank_is_none() {
        assert_eq!(LabelDescription::parse(None).unwrap(), None);
        assert_eq!(LabelDescription::parse(Some("  ")).unwrap(), None);
        assert_eq!(
            LabelDescription::parse(Some(" for later ")).unwrap().unwrap().as_str(),
            "for later"
        );
        assert!(LabelDescription::parse(Some("x".repeat(256).as_str())).is_err());
    }
}
