//! Integration settings and exports

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{ServiceError, ServiceResult};
use crate::integrations::{IntegrationClient, IntegrationRegistry};
use crate::models::{
    Integration, IntegrationChanges, IntegrationKind, ItemFilter, LibraryItemDetail, Pagination,
};

/// Page size used when collecting items to export
const EXPORT_BATCH: u32 = 100;

#[derive(Debug, Clone)]
pub struct SetIntegrationInput {
    pub id: Option<Uuid>,
    pub name: String,
    /// Required on insert. On update, absent keeps the stored token.
    pub token: Option<String>,
    pub enabled: Option<bool>,
    pub settings: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub integration: Integration,
    /// Records accepted by the provider
    pub exported: usize,
}

fn client_for(
    registry: &IntegrationRegistry,
    kind: IntegrationKind,
) -> ServiceResult<Arc<dyn IntegrationClient>> {
    registry
        .client(kind)
        .ok_or_else(|| ServiceError::BadRequest(format!("{kind} is not available")))
}

pub async fn integrations(store: &dyn Store, uid: Uuid) -> ServiceResult<Vec<Integration>> {
    Ok(store.list_integrations(uid).await?)
}

/// Create or update an integration.
///
/// New tokens are checked with (or, for Pocket, exchanged through) the
/// provider before anything is stored. Updates without a token, or with the
/// stored one, keep it and skip the round-trip. Stored tokens are never
/// returned, so a Pocket integration can only be updated without one.
pub async fn set_integration(
    store: &dyn Store,
    registry: &IntegrationRegistry,
    uid: Uuid,
    input: SetIntegrationInput,
) -> ServiceResult<Integration> {
    let kind: IntegrationKind = input.name.parse()?;
    let new_token = input.token.filter(|t| !t.trim().is_empty());

    let existing = match input.id {
        Some(id) => Some(store.get_integration(uid, id).await?),
        None => None,
    };
    let same_kind = existing
        .as_ref()
        .filter(|current| current.name == kind.as_str());

    let token = match (new_token, same_kind) {
        (None, Some(current)) => current.token.clone(),
        (None, None) => return Err(ServiceError::BadRequest("token is required".into())),
        (Some(token), Some(current)) if current.token == token => token,
        (Some(token), _) => client_for(registry, kind)?
            .access_token(&token)
            .await?
            .ok_or(ServiceError::InvalidToken { integration: kind })?,
    };

    let changes = IntegrationChanges {
        id: input.id,
        kind,
        token,
        enabled: input
            .enabled
            .unwrap_or_else(|| existing.as_ref().map_or(true, |i| i.enabled)),
        settings: input
            .settings
            .or_else(|| existing.and_then(|i| i.settings)),
    };

    let saved = store.save_integration(uid, changes).await?;
    tracing::info!(integration_id = %saved.id, integration = %kind, "integration saved");
    Ok(saved)
}

pub async fn delete_integration(
    store: &dyn Store,
    uid: Uuid,
    id: Uuid,
) -> ServiceResult<Integration> {
    let deleted = store.delete_integration(uid, id).await?;
    tracing::info!(integration_id = %id, "integration deleted");
    Ok(deleted)
}

/// Push items changed since the last sync (all items the first time), then
/// record the sync time. The time is taken before collecting so edits made
/// during the export are picked up next run.
pub async fn export_to_integration(
    store: &dyn Store,
    registry: &IntegrationRegistry,
    uid: Uuid,
    id: Uuid,
) -> ServiceResult<ExportOutcome> {
    let integration = store.get_integration(uid, id).await?;
    if !integration.enabled {
        return Err(ServiceError::BadRequest(format!(
            "{} integration is disabled",
            integration.name
        )));
    }
    let kind = integration.kind()?;
    let client = client_for(registry, kind)?;

    let started_at = Utc::now();
    let items = changed_items(store, uid, &integration).await?;

    let exported = client
        .export(&integration.token, integration.settings.as_ref(), &items)
        .await
        .inspect_err(|e| tracing::warn!(integration = %kind, error = %e, "export failed"))?;

    let integration = store.mark_integration_synced(uid, id, started_at).await?;
    tracing::info!(integration = %kind, items = items.len(), exported, "export complete");

    Ok(ExportOutcome {
        integration,
        exported,
    })
}

async fn changed_items(
    store: &dyn Store,
    uid: Uuid,
    integration: &Integration,
) -> ServiceResult<Vec<LibraryItemDetail>> {
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let batch = store
            .list_library_items(
                uid,
                ItemFilter {
                    page: Pagination::new(page, EXPORT_BATCH),
                    updated_since: integration.synced_at,
                },
            )
            .await?;
        let has_next = batch.has_next();
        items.extend(batch.items);
        if !has_next {
            return Ok(items);
        }
        page += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::ErrorCode;
    use crate::integrations::{IntegrationError, IntegrationResult};
    use crate::services::highlights::{create_highlight, CreateHighlightInput};
    use crate::services::library_items::{save_page, SavePageInput};
    use crate::services::test_support::store_with_user;

    /// Accepts the token "good", records exported item urls
    #[derive(Default)]
    struct FakeClient {
        token_checks: Mutex<usize>,
        exported: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl IntegrationClient for FakeClient {
        fn kind(&self) -> IntegrationKind {
            IntegrationKind::Readwise
        }

        async fn access_token(&self, token: &str) -> IntegrationResult<Option<String>> {
            *self.token_checks.lock().unwrap() += 1;
            Ok((token == "good").then(|| token.to_owned()))
        }

        async fn export(
            &self,
            _token: &str,
            _settings: Option<&Value>,
            items: &[LibraryItemDetail],
        ) -> IntegrationResult<usize> {
            if self.fail {
                return Err(IntegrationError::Status {
                    integration: IntegrationKind::Readwise,
                    status: 502,
                });
            }
            let mut exported = self.exported.lock().unwrap();
            exported.extend(items.iter().map(|d| d.item.url.clone()));
            Ok(items.len())
        }
    }

    fn with_client(client: Arc<FakeClient>) -> IntegrationRegistry {
        let mut registry = IntegrationRegistry::new();
        registry.register(client);
        registry
    }

    fn readwise(token: &str) -> SetIntegrationInput {
        SetIntegrationInput {
            id: None,
            name: "readwise".into(),
            token: Some(token.into()),
            enabled: None,
            settings: None,
        }
    }

    async fn save(store: &dyn Store, uid: Uuid, url: &str) -> Uuid {
        save_page(
            store,
            uid,
            SavePageInput {
                url: url.into(),
                client_request_id: "c".into(),
                title: None,
                original_content: "text".into(),
            },
        )
        .await
        .unwrap()
        .library_item_id
    }

    #[tokio::test]
    async fn rejected_token_is_invalid_token() {
        let (store, uid) = store_with_user().await;
        let registry = with_client(Arc::new(FakeClient::default()));

        let err = set_integration(&store, &registry, uid, readwise("bad"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidToken));
        assert!(integrations(&store, uid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_name_is_bad_request() {
        let (store, uid) = store_with_user().await;
        let registry = with_client(Arc::new(FakeClient::default()));
        let mut input = readwise("good");
        input.name = "instapaper".into();

        let err = set_integration(&store, &registry, uid, input)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadRequest));
    }

    #[tokio::test]
    async fn second_integration_of_same_kind_already_exists() {
        let (store, uid) = store_with_user().await;
        let registry = with_client(Arc::new(FakeClient::default()));

        let created = set_integration(&store, &registry, uid, readwise("good"))
            .await
            .unwrap();
        assert_eq!(created.name, "READWISE");
        assert!(created.enabled);

        let err = set_integration(&store, &registry, uid, readwise("good"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::AlreadyExists));
    }

    #[tokio::test]
    async fn update_keeps_token_without_revalidating() {
        let (store, uid) = store_with_user().await;
        let client = Arc::new(FakeClient::default());
        let registry = with_client(client.clone());
        let created = set_integration(&store, &registry, uid, readwise("good"))
            .await
            .unwrap();

        let mut input = readwise("good");
        input.id = Some(created.id);
        input.enabled = Some(false);
        let updated = set_integration(&store, &registry, uid, input).await.unwrap();
        assert!(!updated.enabled);
        assert_eq!(updated.id, created.id);
        assert_eq!(*client.token_checks.lock().unwrap(), 1);
    }

    /// Pocket stand-in: each request code can be exchanged once
    #[derive(Default)]
    struct OneShotPocket {
        used: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl IntegrationClient for OneShotPocket {
        fn kind(&self) -> IntegrationKind {
            IntegrationKind::Pocket
        }

        async fn access_token(&self, code: &str) -> IntegrationResult<Option<String>> {
            let mut used = self.used.lock().unwrap();
            if used.iter().any(|c| c == code) {
                return Ok(None);
            }
            used.push(code.to_owned());
            Ok(Some(format!("access-for-{code}")))
        }

        async fn export(
            &self,
            _token: &str,
            _settings: Option<&Value>,
            _items: &[LibraryItemDetail],
        ) -> IntegrationResult<usize> {
            Err(IntegrationError::Unsupported {
                integration: IntegrationKind::Pocket,
            })
        }
    }

    #[tokio::test]
    async fn pocket_update_without_token_keeps_exchanged_token() {
        let (store, uid) = store_with_user().await;
        let pocket = Arc::new(OneShotPocket::default());
        let mut registry = IntegrationRegistry::new();
        registry.register(pocket.clone());

        let input = SetIntegrationInput {
            id: None,
            name: "POCKET".into(),
            token: Some("code-1".into()),
            enabled: None,
            settings: None,
        };
        let created = set_integration(&store, &registry, uid, input).await.unwrap();
        assert_eq!(created.token, "access-for-code-1");

        let disable = SetIntegrationInput {
            id: Some(created.id),
            name: "POCKET".into(),
            token: None,
            enabled: Some(false),
            settings: None,
        };
        let updated = set_integration(&store, &registry, uid, disable).await.unwrap();
        assert!(!updated.enabled);
        assert_eq!(updated.token, "access-for-code-1");
        assert_eq!(pocket.used.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn insert_without_token_is_bad_request() {
        let (store, uid) = store_with_user().await;
        let client = Arc::new(FakeClient::default());
        let registry = with_client(client.clone());
        let mut input = readwise("good");
        input.token = None;

        let err = set_integration(&store, &registry, uid, input)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadRequest));
        assert_eq!(*client.token_checks.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn update_unknown_is_not_found() {
        let (store, uid) = store_with_user().await;
        let registry = with_client(Arc::new(FakeClient::default()));
        let mut input = readwise("good");
        input.id = Some(Uuid::new_v4());

        let err = set_integration(&store, &registry, uid, input)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
    }

    #[tokio::test]
    async fn export_sends_changed_items_and_stamps_sync() {
        let (store, uid) = store_with_user().await;
        let client = Arc::new(FakeClient::default());
        let registry = with_client(client.clone());
        let integration = set_integration(&store, &registry, uid, readwise("good"))
            .await
            .unwrap();

        let first = save(&store, uid, "https://example.com/1").await;
        save(&store, uid, "https://example.com/2").await;

        let outcome = export_to_integration(&store, &registry, uid, integration.id)
            .await
            .unwrap();
        assert_eq!(outcome.exported, 2);
        assert!(outcome.integration.synced_at.is_some());

        // Only the item touched after the sync goes out next time
        create_highlight(
            &store,
            uid,
            CreateHighlightInput {
                library_item_id: first,
                quote: "q".into(),
                patch: None,
                annotation: None,
            },
        )
        .await
        .unwrap();
        let outcome = export_to_integration(&store, &registry, uid, integration.id)
            .await
            .unwrap();
        assert_eq!(outcome.exported, 1);

        let exported = client.exported.lock().unwrap().clone();
        assert_eq!(exported.len(), 3);
        assert_eq!(exported[2], "https://example.com/1");
    }

    #[tokio::test]
    async fn disabled_integration_is_bad_request() {
        let (store, uid) = store_with_user().await;
        let registry = with_client(Arc::new(FakeClient::default()));
        let mut input = readwise("good");
        input.enabled = Some(false);
        let integration = set_integration(&store, &registry, uid, input).await.unwrap();

        let err = export_to_integration(&store, &registry, uid, integration.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadRequest));
    }

    #[tokio::test]
    async fn provider_failure_is_request_failed_and_not_stamped() {
        let (store, uid) = store_with_user().await;
        let registry = with_client(Arc::new(FakeClient::default()));
        let integration = set_integration(&store, &registry, uid, readwise("good"))
            .await
            .unwrap();

        let failing = with_client(Arc::new(FakeClient {
            fail: true,
            ..Default::default()
        }));
        let err = export_to_integration(&store, &failing, uid, integration.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::RequestFailed));

        let stored = store.get_integration(uid, integration.id).await.unwrap();
        assert!(stored.synced_at.is_none());
    }

    #[tokio::test]
    async fn delete_then_export_is_not_found() {
        let (store, uid) = store_with_user().await;
        let registry = with_client(Arc::new(FakeClient::default()));
        let integration = set_integration(&store, &registry, uid, readwise("good"))
            .await
            .unwrap();

        delete_integration(&store, uid, integration.id).await.unwrap();
        let err = export_to_integration(&store, &registry, uid, integration.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
    }
}
