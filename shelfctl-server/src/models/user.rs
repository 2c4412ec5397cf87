use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

/// Loosely validated, lowercased email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }
        match trimmed.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
                Ok(Self(trimmed.to_lowercase()))
            }
            _ => Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like name@example.com",
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Freshly generated API key
pub fn generate_api_key() -> String {
    format!("shelf_{}", Uuid::new_v4().simple())
}
