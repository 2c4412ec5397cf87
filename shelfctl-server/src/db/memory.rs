//! In-memory [`Store`] used by `serve --ephemeral` and the service tests.
//!
//! All state sits behind one `tokio::sync::RwLock`, so every method is
//! atomic the same way a Postgres transaction is.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LabelTarget, Store, StoreError, StoreResult};
use crate::models::position::close_gap;
use crate::models::{
    Email, Highlight, HighlightDetail, Integration, IntegrationChanges, ItemFilter, Label,
    LabelChanges, LabelName, LabelSelection, LibraryItem, LibraryItemDetail, MovePlan, NewHighlight,
    NewLabel, NewLibraryItem, Paginated, User,
};

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    labels: HashMap<Uuid, Label>,
    items: HashMap<Uuid, LibraryItem>,
    highlights: HashMap<Uuid, Highlight>,
    /// Library item id -> label ids
    item_labels: HashMap<Uuid, Vec<Uuid>>,
    /// Highlight id -> label ids
    highlight_labels: HashMap<Uuid, Vec<Uuid>>,
    integrations: HashMap<Uuid, Integration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryState {
    fn user_labels(&self, uid: Uuid) -> Vec<Label> {
        let mut labels: Vec<Label> = self
            .labels
            .values()
            .filter(|l| l.user_id == uid)
            .cloned()
            .collect();
        labels.sort_by_key(|l| l.position);
        labels
    }

    fn owned_label(&self, uid: Uuid, id: Uuid) -> StoreResult<&Label> {
        self.labels
            .get(&id)
            .filter(|l| l.user_id == uid)
            .ok_or_else(|| StoreError::not_found("label", id))
    }

    fn name_taken(&self, uid: Uuid, name: &LabelName, except: Option<Uuid>) -> bool {
        self.labels
            .values()
            .any(|l| l.user_id == uid && Some(l.id) != except && l.has_name(name))
    }

    fn insert_label(&mut self, uid: Uuid, new: &NewLabel) -> StoreResult<Label> {
        if self.name_taken(uid, &new.name, None) {
            return Err(StoreError::Conflict {
                resource: "label",
                field: "name",
            });
        }

        let position = self
            .labels
            .values()
            .filter(|l| l.user_id == uid)
            .map(|l| l.position)
            .max()
            .unwrap_or(0)
            + 1;
        let now = Utc::now();
        let label = Label {
            id: Uuid::new_v4(),
            user_id: uid,
            name: new.name.as_str().to_owned(),
            color: new.color_at(position),
            description: new.description.as_ref().map(|d| d.as_str().to_owned()),
            position,
            created_at: now,
            updated_at: now,
        };
        self.labels.insert(label.id, label.clone());
        Ok(label)
    }

    fn labels_by_id(&self, ids: Option<&Vec<Uuid>>) -> Vec<Label> {
        let mut labels: Vec<Label> = ids
            .into_iter()
            .flatten()
            .filter_map(|id| self.labels.get(id).cloned())
            .collect();
        labels.sort_by_key(|l| l.position);
        labels
    }

    fn detail(&self, item: &LibraryItem) -> LibraryItemDetail {
        let mut highlights: Vec<&Highlight> = self
            .highlights
            .values()
            .filter(|h| h.library_item_id == item.id)
            .collect();
        highlights.sort_by_key(|h| (h.created_at, h.id));

        LibraryItemDetail {
            item: item.clone(),
            labels: self.labels_by_id(self.item_labels.get(&item.id)),
            highlights: highlights
                .into_iter()
                .map(|h| HighlightDetail {
                    highlight: h.clone(),
                    labels: self.labels_by_id(self.highlight_labels.get(&h.id)),
                })
                .collect(),
        }
    }

    fn owns_target(&self, uid: Uuid, target: LabelTarget, id: Uuid) -> bool {
        match target {
            LabelTarget::LibraryItem => self.items.get(&id).is_some_and(|i| i.user_id == uid),
            LabelTarget::Highlight => self.highlights.get(&id).is_some_and(|h| h.user_id == uid),
        }
    }

    fn set_labels(
        &mut self,
        uid: Uuid,
        target: LabelTarget,
        target_id: Uuid,
        selection: LabelSelection,
    ) -> StoreResult<Vec<Label>> {
        if !self.owns_target(uid, target, target_id) {
            let resource = match target {
                LabelTarget::LibraryItem => "library item",
                LabelTarget::Highlight => "highlight",
            };
            return Err(StoreError::not_found(resource, target_id));
        }

        let mut ids = super::repos::dedup_ids(selection.ids);
        for id in &ids {
            self.owned_label(uid, *id)?;
        }

        for new in &selection.create {
            let existing = self
                .labels
                .values()
                .find(|l| l.user_id == uid && l.has_name(&new.name))
                .map(|l| l.id);
            let id = match existing {
                Some(id) => id,
                None => self.insert_label(uid, new)?.id,
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let now = Utc::now();
        let links = match target {
            LabelTarget::LibraryItem => {
                if let Some(item) = self.items.get_mut(&target_id) {
                    item.updated_at = now;
                }
                &mut self.item_labels
            }
            LabelTarget::Highlight => {
                if let Some(highlight) = self.highlights.get_mut(&target_id) {
                    highlight.updated_at = now;
                }
                &mut self.highlight_labels
            }
        };
        links.insert(target_id, ids.clone());

        Ok(self.labels_by_id(Some(&ids)))
    }

    fn unlink_label(&mut self, label_id: Uuid) {
        for ids in self
            .item_labels
            .values_mut()
            .chain(self.highlight_labels.values_mut())
        {
            ids.retain(|id| *id != label_id);
        }
    }

    fn remove_highlight(&mut self, id: Uuid) -> Option<Highlight> {
        self.highlight_labels.remove(&id);
        self.highlights.remove(&id)
    }

    fn owned_integration(&self, uid: Uuid, id: Uuid) -> StoreResult<&Integration> {
        self.integrations
            .get(&id)
            .filter(|i| i.user_id == uid)
            .ok_or_else(|| StoreError::not_found("integration", id))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, email: &Email, api_key: &str) -> StoreResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == email.as_str()) {
            return Err(StoreError::Conflict {
                resource: "user",
                field: "email",
            });
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.as_str().to_owned(),
            api_key: api_key.to_owned(),
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_api_key(&self, api_key: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.api_key == api_key).cloned())
    }

    async fn list_labels(&self, uid: Uuid) -> StoreResult<Vec<Label>> {
        Ok(self.state.read().await.user_labels(uid))
    }

    async fn create_label(&self, uid: Uuid, label: NewLabel) -> StoreResult<Label> {
        self.state.write().await.insert_label(uid, &label)
    }

    async fn update_label(
        &self,
        uid: Uuid,
        id: Uuid,
        changes: LabelChanges,
    ) -> StoreResult<Label> {
        let mut state = self.state.write().await;
        state.owned_label(uid, id)?;
        if state.name_taken(uid, &changes.name, Some(id)) {
            return Err(StoreError::Conflict {
                resource: "label",
                field: "name",
            });
        }

        let label = state
            .labels
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("label", id))?;
        label.name = changes.name.as_str().to_owned();
        label.color = changes.color.as_str().to_owned();
        label.description = changes.description.map(|d| d.as_str().to_owned());
        label.updated_at = Utc::now();
        Ok(label.clone())
    }

    async fn delete_label(&self, uid: Uuid, id: Uuid) -> StoreResult<Label> {
        let mut state = self.state.write().await;
        state.owned_label(uid, id)?;

        let deleted = state
            .labels
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("label", id))?;
        state.unlink_label(id);
        for label in state.labels.values_mut().filter(|l| l.user_id == uid) {
            label.position = close_gap(deleted.position, label.position);
        }
        Ok(deleted)
    }

    async fn move_label(&self, uid: Uuid, id: Uuid, after: Option<Uuid>) -> StoreResult<Label> {
        let mut state = self.state.write().await;
        let current = state.owned_label(uid, id)?.position;
        let after_position = match after {
            Some(after_id) => Some(state.owned_label(uid, after_id)?.position),
            None => None,
        };

        let plan = MovePlan::new(current, after_position);
        if !plan.is_noop() {
            let now = Utc::now();
            for label in state.labels.values_mut().filter(|l| l.user_id == uid) {
                label.position = plan.apply(label.position);
                if label.id == id {
                    label.updated_at = now;
                }
            }
        }

        Ok(state.owned_label(uid, id)?.clone())
    }

    async fn set_item_labels(
        &self,
        uid: Uuid,
        item_id: Uuid,
        selection: LabelSelection,
    ) -> StoreResult<Vec<Label>> {
        self.state
            .write()
            .await
            .set_labels(uid, LabelTarget::LibraryItem, item_id, selection)
    }

    async fn set_highlight_labels(
        &self,
        uid: Uuid,
        highlight_id: Uuid,
        selection: LabelSelection,
    ) -> StoreResult<Vec<Label>> {
        self.state
            .write()
            .await
            .set_labels(uid, LabelTarget::Highlight, highlight_id, selection)
    }

    async fn upsert_library_item(
        &self,
        uid: Uuid,
        item: NewLibraryItem,
    ) -> StoreResult<LibraryItem> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        if let Some(existing) = state
            .items
            .values_mut()
            .find(|i| i.user_id == uid && i.url == item.url.as_str())
        {
            existing.title = item.title;
            existing.content = item.content;
            existing.word_count = item.word_count;
            existing.saved_at = now;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let saved = LibraryItem {
            id: Uuid::new_v4(),
            user_id: uid,
            url: item.url.as_str().to_owned(),
            title: item.title,
            content: item.content,
            word_count: item.word_count,
            saved_at: now,
            updated_at: now,
        };
        state.items.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn get_library_item(&self, uid: Uuid, id: Uuid) -> StoreResult<LibraryItemDetail> {
        let state = self.state.read().await;
        state
            .items
            .get(&id)
            .filter(|i| i.user_id == uid)
            .map(|i| state.detail(i))
            .ok_or_else(|| StoreError::not_found("library item", id))
    }

    async fn list_library_items(
        &self,
        uid: Uuid,
        filter: ItemFilter,
    ) -> StoreResult<Paginated<LibraryItemDetail>> {
        let state = self.state.read().await;
        let mut items: Vec<&LibraryItem> = state
            .items
            .values()
            .filter(|i| i.user_id == uid)
            .filter(|i| filter.updated_since.map_or(true, |since| i.updated_at > since))
            .collect();
        items.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then(a.id.cmp(&b.id)));

        Ok(filter.page.slice(items).map(|i| state.detail(i)))
    }

    async fn delete_library_item(&self, uid: Uuid, id: Uuid) -> StoreResult<LibraryItem> {
        let mut state = self.state.write().await;
        let owned = state.items.get(&id).is_some_and(|i| i.user_id == uid);
        if !owned {
            return Err(StoreError::not_found("library item", id));
        }

        let highlight_ids: Vec<Uuid> = state
            .highlights
            .values()
            .filter(|h| h.library_item_id == id)
            .map(|h| h.id)
            .collect();
        for highlight_id in highlight_ids {
            state.remove_highlight(highlight_id);
        }
        state.item_labels.remove(&id);
        state
            .items
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("library item", id))
    }

    async fn create_highlight(&self, uid: Uuid, highlight: NewHighlight) -> StoreResult<Highlight> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let item = state
            .items
            .get_mut(&highlight.library_item_id)
            .filter(|i| i.user_id == uid)
            .ok_or_else(|| StoreError::not_found("library item", highlight.library_item_id))?;
        item.updated_at = now;

        let created = Highlight {
            id: Uuid::new_v4(),
            user_id: uid,
            library_item_id: highlight.library_item_id,
            quote: highlight.quote,
            patch: highlight.patch,
            annotation: highlight.annotation,
            created_at: now,
            updated_at: now,
        };
        state.highlights.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete_highlight(&self, uid: Uuid, id: Uuid) -> StoreResult<Highlight> {
        let mut state = self.state.write().await;
        let owned = state.highlights.get(&id).is_some_and(|h| h.user_id == uid);
        if !owned {
            return Err(StoreError::not_found("highlight", id));
        }
        state
            .remove_highlight(id)
            .ok_or_else(|| StoreError::not_found("highlight", id))
    }

    async fn list_integrations(&self, uid: Uuid) -> StoreResult<Vec<Integration>> {
        let state = self.state.read().await;
        let mut integrations: Vec<Integration> = state
            .integrations
            .values()
            .filter(|i| i.user_id == uid)
            .cloned()
            .collect();
        integrations.sort_by_key(|i| (i.created_at, i.id));
        Ok(integrations)
    }

    async fn get_integration(&self, uid: Uuid, id: Uuid) -> StoreResult<Integration> {
        let state = self.state.read().await;
        state.owned_integration(uid, id).cloned()
    }

    async fn save_integration(
        &self,
        uid: Uuid,
        changes: IntegrationChanges,
    ) -> StoreResult<Integration> {
        let mut state = self.state.write().await;
        let name = changes.kind.as_str();

        if let Some(id) = changes.id {
            state.owned_integration(uid, id)?;
        }
        let taken = state
            .integrations
            .values()
            .any(|i| i.user_id == uid && i.name == name && Some(i.id) != changes.id);
        if taken {
            return Err(StoreError::Conflict {
                resource: "integration",
                field: "name",
            });
        }

        let now = Utc::now();
        let existing = match changes.id {
            Some(id) => state.integrations.get_mut(&id),
            None => None,
        };
        let integration = match existing {
            Some(existing) => {
                existing.name = name.to_owned();
                existing.token = changes.token;
                existing.enabled = changes.enabled;
                existing.settings = changes.settings;
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let created = Integration {
                    id: Uuid::new_v4(),
                    user_id: uid,
                    name: name.to_owned(),
                    token: changes.token,
                    enabled: changes.enabled,
                    settings: changes.settings,
                    synced_at: None,
                    created_at: now,
                    updated_at: now,
                };
                state.integrations.insert(created.id, created.clone());
                created
            }
        };
        Ok(integration)
    }

    async fn delete_integration(&self, uid: Uuid, id: Uuid) -> StoreResult<Integration> {
        let mut state = self.state.write().await;
        state.owned_integration(uid, id)?;
        state
            .integrations
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("integration", id))
    }

    async fn mark_integration_synced(
        &self,
        uid: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Integration> {
        let mut state = self.state.write().await;
        state.owned_integration(uid, id)?;
        let integration = state
            .integrations
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("integration", id))?;
        integration.synced_at = Some(at);
        integration.updated_at = Utc::now();
        Ok(integration.clone())
    }
}
