//! Third-party sync connectors

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Supported sync providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegrationKind {
    Pocket,
    Readwise,
    Notion,
}

impl IntegrationKind {
    pub const ALL: [IntegrationKind; 3] = [Self::Pocket, Self::Readwise, Self::Notion];

    /// Stored / wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pocket => "POCKET",
            Self::Readwise => "READWISE",
            Self::Notion => "NOTION",
        }
    }
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntegrationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POCKET" => Ok(Self::Pocket),
            "READWISE" => Ok(Self::Readwise),
            "NOTION" => Ok(Self::Notion),
            _ => Err(ValidationError::InvalidVariant {
                field: "integration",
                value: s.to_owned(),
            }),
        }
    }
}

/// Integration record from the store
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Integration {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub token: String,
    pub enabled: bool,
    pub settings: Option<serde_json::Value>,
    pub synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Integration {
    pub fn kind(&self) -> Result<IntegrationKind, ValidationError> {
        self.name.parse()
    }
}

/// Insert (no id) or update (id) an integration
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationChanges {
    pub id: Option<Uuid>,
    pub kind: IntegrationKind,
    pub token: String,
    pub enabled: bool,
    pub settings: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("readwise".parse::<IntegrationKind>().unwrap(), IntegrationKind::Readwise);
        assert_eq!(" Notion ".parse::<IntegrationKind>().unwrap(), IntegrationKind::Notion);
        assert_eq!("POCKET".parse::<IntegrationKind>().unwrap(), IntegrationKind::Pocket);
        assert!(matches!(
            "instapaper".parse::<IntegrationKind>().unwrap_err(),
            ValidationError::InvalidVariant { .. }
        ));
    }

    #[test]
    fn names_round_trip() {
        for kind in IntegrationKind::ALL {
            assert_eq!(kind.as_str().parse::<IntegrationKind>().unwrap(), kind);
        }
    }
}
