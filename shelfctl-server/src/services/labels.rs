//! Label operations

use uuid::Uuid;

use crate::db::{Store, StoreError};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    Label, LabelChanges, LabelColor, LabelDescription, LabelName, LabelSelection, NewLabel,
};

#[derive(Debug, Clone, Default)]
pub struct CreateLabelInput {
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateLabelInput {
    pub label_id: Uuid,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

/// Replacement label set: existing ids plus labels to find-or-create by name
#[derive(Debug, Clone, Default)]
pub struct SetLabelsInput {
    pub label_ids: Option<Vec<Uuid>>,
    pub labels: Option<Vec<CreateLabelInput>>,
}

#[derive(Debug, Clone, Copy)]
pub struct MoveLabelInput {
    pub label_id: Uuid,
    pub after_label_id: Option<Uuid>,
}

impl CreateLabelInput {
    fn validate(&self) -> ServiceResult<NewLabel> {
        Ok(NewLabel {
            name: LabelName::new(&self.name)?,
            color: self.color.as_deref().map(LabelColor::new).transpose()?,
            description: LabelDescription::parse(self.description.as_deref())?,
        })
    }
}

impl SetLabelsInput {
    fn validate(self) -> ServiceResult<LabelSelection> {
        if self.label_ids.is_none() && self.labels.is_none() {
            return Err(ServiceError::BadRequest(
                "either labelIds or labels is required".into(),
            ));
        }

        let create = self
            .labels
            .unwrap_or_default()
            .iter()
            .map(CreateLabelInput::validate)
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(LabelSelection {
            ids: self.label_ids.unwrap_or_default(),
            create,
        })
    }
}

/// Name conflicts on labels get their own code.
fn label_conflict(name: &LabelName) -> impl FnOnce(StoreError) -> ServiceError + '_ {
    move |e| match e {
        StoreError::Conflict {
            resource: "label", ..
        } => ServiceError::LabelAlreadyExists {
            name: name.as_str().to_owned(),
        },
        other => other.into(),
    }
}

pub async fn labels(store: &dyn Store, uid: Uuid) -> ServiceResult<Vec<Label>> {
    Ok(store.list_labels(uid).await?)
}

pub async fn create_label(
    store: &dyn Store,
    uid: Uuid,
    input: CreateLabelInput,
) -> ServiceResult<Label> {
    let label = input.validate()?;
    let name = label.name.clone();

    let created = store
        .create_label(uid, label)
        .await
        .map_err(label_conflict(&name))?;

    tracing::info!(label_id = %created.id, position = created.position, "label created");
    Ok(created)
}

pub async fn update_label(
    store: &dyn Store,
    uid: Uuid,
    input: UpdateLabelInput,
) -> ServiceResult<Label> {
    let changes = LabelChanges {
        name: LabelName::new(&input.name)?,
        color: LabelColor::new(&input.color)?,
        description: LabelDescription::parse(input.description.as_deref())?,
    };
    let name = changes.name.clone();

    Ok(store
        .update_label(uid, input.label_id, changes)
        .await
        .map_err(label_conflict(&name))?)
}

pub async fn delete_label(store: &dyn Store, uid: Uuid, id: Uuid) -> ServiceResult<Label> {
    let deleted = store.delete_label(uid, id).await?;
    tracing::info!(label_id = %id, "label deleted");
    Ok(deleted)
}

pub async fn set_labels(
    store: &dyn Store,
    uid: Uuid,
    library_item_id: Uuid,
    input: SetLabelsInput,
) -> ServiceResult<Vec<Label>> {
    let selection = input.validate()?;
    Ok(store
        .set_item_labels(uid, library_item_id, selection)
        .await?)
}

pub async fn set_labels_for_highlight(
    store: &dyn Store,
    uid: Uuid,
    highlight_id: Uuid,
    input: SetLabelsInput,
) -> ServiceResult<Vec<Label>> {
    let selection = input.validate()?;
    Ok(store
        .set_highlight_labels(uid, highlight_id, selection)
        .await?)
}

pub async fn move_label(
    store: &dyn Store,
    uid: Uuid,
    input: MoveLabelInput,
) -> ServiceResult<Label> {
    let moved = store
        .move_label(uid, input.label_id, input.after_label_id)
        .await?;
    tracing::debug!(label_id = %moved.id, position = moved.position, "label moved");
    Ok(moved)
}
