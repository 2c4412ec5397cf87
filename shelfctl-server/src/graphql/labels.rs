//! Label queries and mutations

use async_graphql::{Context, InputObject, Object, SimpleObject, ID};

use super::types::{label_views, LabelView};
use super::{app_state, authorized, parse_id, parse_ids, respond};
use crate::error::ServiceResult;
use crate::services::labels as service;

op_result!(LabelsResult, LabelsSuccess, LabelsError, LabelsErrorCode {
    Unauthorized,
    BadRequest,
});

op_result!(CreateLabelResult, CreateLabelSuccess, CreateLabelError, CreateLabelErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
    LabelAlreadyExists,
});

op_result!(DeleteLabelResult, DeleteLabelSuccess, DeleteLabelError, DeleteLabelErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
});

op_result!(UpdateLabelResult, UpdateLabelSuccess, UpdateLabelError, UpdateLabelErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
    LabelAlreadyExists,
});

op_result!(SetLabelsResult, SetLabelsSuccess, SetLabelsError, SetLabelsErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
});

op_result!(MoveLabelResult, MoveLabelSuccess, MoveLabelError, MoveLabelErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
});

#[derive(SimpleObject, Debug)]
pub struct LabelsSuccess {
    pub labels: Vec<LabelView>,
}

#[derive(SimpleObject, Debug)]
pub struct CreateLabelSuccess {
    pub label: LabelView,
}

#[derive(SimpleObject, Debug)]
pub struct DeleteLabelSuccess {
    pub label: LabelView,
}

#[derive(SimpleObject, Debug)]
pub struct UpdateLabelSuccess {
    pub label: LabelView,
}

/// The full label set of the target after the change
#[derive(SimpleObject, Debug)]
pub struct SetLabelsSuccess {
    pub labels: Vec<LabelView>,
}

#[derive(SimpleObject, Debug)]
pub struct MoveLabelSuccess {
    pub label: LabelView,
}

#[derive(InputObject, Debug, Clone)]
pub struct CreateLabelInput {
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl From<CreateLabelInput> for service::CreateLabelInput {
    fn from(input: CreateLabelInput) -> Self {
        Self {
            name: input.name,
            color: input.color,
            description: input.description,
        }
    }
}

#[derive(InputObject, Debug)]
pub struct UpdateLabelInput {
    pub label_id: ID,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

#[derive(InputObject, Debug)]
pub struct SetLabelsInput {
    pub page_id: ID,
    pub label_ids: Option<Vec<ID>>,
    /// Created by name when no label with that name exists
    pub labels: Option<Vec<CreateLabelInput>>,
}

#[derive(InputObject, Debug)]
pub struct SetLabelsForHighlightInput {
    pub highlight_id: ID,
    pub label_ids: Option<Vec<ID>>,
    pub labels: Option<Vec<CreateLabelInput>>,
}

#[derive(InputObject, Debug)]
pub struct MoveLabelInput {
    pub label_id: ID,
    /// Omit to move the label to the top
    pub after_label_id: Option<ID>,
}

fn selection(
    label_ids: Option<Vec<ID>>,
    labels: Option<Vec<CreateLabelInput>>,
) -> ServiceResult<service::SetLabelsInput> {
    Ok(service::SetLabelsInput {
        label_ids: label_ids
            .map(|ids| parse_ids(&ids, "label"))
            .transpose()?,
        labels: labels.map(|labels| labels.into_iter().map(Into::into).collect()),
    })
}

#[derive(Default)]
pub struct LabelQuery;

#[Object]
impl LabelQuery {
    /// Labels of the caller, ordered by position
    async fn labels(&self, ctx: &Context<'_>) -> async_graphql::Result<LabelsResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            service::labels(state.store(), uid).await
        }
        .await;

        respond(result, |labels| {
            LabelsResult::LabelsSuccess(LabelsSuccess {
                labels: label_views(labels),
            })
        })
    }
}

#[derive(Default)]
pub struct LabelMutation;

#[Object]
impl LabelMutation {
    async fn create_label(
        &self,
        ctx: &Context<'_>,
        input: CreateLabelInput,
    ) -> async_graphql::Result<CreateLabelResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            service::create_label(state.store(), uid, input.into()).await
        }
        .await;

        respond(result, |label| {
            CreateLabelResult::CreateLabelSuccess(CreateLabelSuccess {
                label: label.into(),
            })
        })
    }

    async fn delete_label(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<DeleteLabelResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let id = parse_id(&id, "label")?;
            service::delete_label(state.store(), uid, id).await
        }
        .await;

        respond(result, |label| {
            DeleteLabelResult::DeleteLabelSuccess(DeleteLabelSuccess {
                label: label.into(),
            })
        })
    }

    async fn update_label(
        &self,
        ctx: &Context<'_>,
        input: UpdateLabelInput,
    ) -> async_graphql::Result<UpdateLabelResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let input = service::UpdateLabelInput {
                label_id: parse_id(&input.label_id, "label")?,
                name: input.name,
                color: input.color,
                description: input.description,
            };
            service::update_label(state.store(), uid, input).await
        }
        .await;

        respond(result, |label| {
            UpdateLabelResult::UpdateLabelSuccess(UpdateLabelSuccess {
                label: label.into(),
            })
        })
    }

    /// Replace the labels of a library item
    async fn set_labels(
        &self,
        ctx: &Context<'_>,
        input: SetLabelsInput,
    ) -> async_graphql::Result<SetLabelsResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let item_id = parse_id(&input.page_id, "library item")?;
            let selection = selection(input.label_ids, input.labels)?;
            service::set_labels(state.store(), uid, item_id, selection).await
        }
        .await;

        respond(result, |labels| {
            SetLabelsResult::SetLabelsSuccess(SetLabelsSuccess {
                labels: label_views(labels),
            })
        })
    }

    async fn set_labels_for_highlight(
        &self,
        ctx: &Context<'_>,
        input: SetLabelsForHighlightInput,
    ) -> async_graphql::Result<SetLabelsResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let highlight_id = parse_id(&input.highlight_id, "highlight")?;
            let selection = selection(input.label_ids, input.labels)?;
            service::set_labels_for_highlight(state.store(), uid, highlight_id, selection).await
        }
        .await;

        respond(result, |labels| {
            SetLabelsResult::SetLabelsSuccess(SetLabelsSuccess {
                labels: label_views(labels),
            })
        })
    }

    async fn move_label(
        &self,
        ctx: &Context<'_>,
        input: MoveLabelInput,
    ) -> async_graphql::Result<MoveLabelResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let input = service::MoveLabelInput {
                label_id: parse_id(&input.label_id, "label")?,
                after_label_id: input
                    .after_label_id
                    .as_ref()
                    .map(|id| parse_id(id, "label"))
                    .transpose()?,
            };
            service::move_label(state.store(), uid, input).await
        }
        .await;

        respond(result, |label| {
            MoveLabelResult::MoveLabelSuccess(MoveLabelSuccess {
                label: label.into(),
            })
        })
    }
}
