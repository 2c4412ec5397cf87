//! User repository

use sqlx::PgPool;

use crate::db::{StoreError, StoreResult};
use crate::models::{Email, User};

use super::conflict_on;

const EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a user. `Conflict` when the email is taken.
    pub async fn create(&self, email: &Email, api_key: &str) -> StoreResult<User> {
        sqlx::query_as(
            r#"
            INSERT INTO users (email, api_key)
            VALUES ($1, $2)
            RETURNING id, email, api_key, created_at
            "#,
        )
        .bind(email.as_str())
        .bind(api_key)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on(e, EMAIL_CONSTRAINT, "user", "email"))
    }

    pub async fn find_by_api_key(&self, api_key: &str) -> StoreResult<Option<User>> {
        sqlx::query_as("SELECT id, email, api_key, created_at FROM users WHERE api_key = $1")
            .bind(api_key)
            .fetch_optional(self.pool)
            .await
            .map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::test_support;
    use crate::models::user::generate_api_key;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_email_conflicts() {
        let pool = test_support::pool().await;
        let user = test_support::user(&pool).await;
        let email = Email::new(&user.email).unwrap();

        let err = UserRepo::new(&pool)
            .create(&email, &generate_api_key())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "email", .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn finds_by_api_key() {
        let pool = test_support::pool().await;
        let user = test_support::user(&pool).await;

        let found = UserRepo::new(&pool).find_by_api_key(&user.api_key).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        let missing = UserRepo::new(&pool).find_by_api_key("nope").await.unwrap();
        assert!(missing.is_none());
    }
}
