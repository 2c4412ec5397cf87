//! User provisioning and API key lookup

use uuid::Uuid;

use crate::db::Store;
use crate::error::ServiceResult;
use crate::models::{user::generate_api_key, Email, User};

/// Create a user with a fresh API key.
pub async fn create_user(store: &dyn Store, email: &str) -> ServiceResult<User> {
    let email = Email::new(email)?;
    let user = store.create_user(&email, &generate_api_key()).await?;
    tracing::info!(user_id = %user.id, "user created");
    Ok(user)
}

/// Resolve an API key to the caller's user id.
pub async fn authenticate(store: &dyn Store, api_key: &str) -> ServiceResult<Option<Uuid>> {
    if api_key.is_empty() {
        return Ok(None);
    }
    Ok(store.find_user_by_api_key(api_key).await?.map(|u| u.id))
}
