//! Postgres repositories
//!
//! Each repository follows these patterns:
//! - Batch loads with `= ANY($1)` for nested data (no N+1)
//! - Handles conflicts via constraints (no check-then-insert)
//! - Uses one transaction per multi-step operation
//! - Serializes label ordering changes per user by locking the user row

pub mod highlights;
pub mod integrations;
pub mod labels;
pub mod library_items;
pub mod users;

pub use highlights::HighlightRepo;
pub use integrations::IntegrationRepo;
pub use labels::{LabelRepo, LabelTarget};
pub use library_items::LibraryItemRepo;
pub use users::UserRepo;

use sqlx::PgConnection;
use uuid::Uuid;

use super::StoreError;

/// Map a unique violation on `constraint` to `StoreError::Conflict`.
pub(crate) fn conflict_on(
    err: sqlx::Error,
    constraint: &str,
    resource: &'static str,
    field: &'static str,
) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(constraint) {
            return StoreError::Conflict { resource, field };
        }
    }
    StoreError::Sqlx(err)
}

/// Take a row lock on the user for the rest of the transaction.
pub(crate) async fn lock_user(conn: &mut PgConnection, uid: Uuid) -> Result<(), StoreError> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(uid)
        .fetch_optional(conn)
        .await?;
    Ok(())
}

/// Keep the first occurrence of each id.
pub(crate) fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared setup for the `requires database` tests.

    use sqlx::PgPool;

    use crate::db::{migrations, UserRepo};
    use crate::models::{user::generate_api_key, Email, User};

    pub async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        pool
    }

    pub async fn user(pool: &PgPool) -> User {
        let email = Email::new(&format!("{}@example.com", uuid::Uuid::new_v4().simple())).unwrap();
        UserRepo::new(pool)
            .create(&email, &generate_api_key())
            .await
            .expect("user creation failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_ids(vec![b, a, b, a]), vec![b, a]);
    }
}
