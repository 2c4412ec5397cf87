//! Integration queries and mutations

use async_graphql::{Context, InputObject, Json, Object, SimpleObject, ID};

use super::types::IntegrationView;
use super::{app_state, authorized, parse_id, respond};
use crate::services::integrations as service;

op_result!(IntegrationsResult, IntegrationsSuccess, IntegrationsError, IntegrationsErrorCode {
    Unauthorized,
    BadRequest,
});

op_result!(SetIntegrationResult, SetIntegrationSuccess, SetIntegrationError, SetIntegrationErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
    AlreadyExists,
    InvalidToken,
    RequestFailed,
});

op_result!(DeleteIntegrationResult, DeleteIntegrationSuccess, DeleteIntegrationError, DeleteIntegrationErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
});

op_result!(ExportToIntegrationResult, ExportToIntegrationSuccess, ExportToIntegrationError, ExportToIntegrationErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
    RequestFailed,
});

#[derive(SimpleObject, Debug)]
pub struct IntegrationsSuccess {
    pub integrations: Vec<IntegrationView>,
}

#[derive(SimpleObject, Debug)]
pub struct SetIntegrationSuccess {
    pub integration: IntegrationView,
}

#[derive(SimpleObject, Debug)]
pub struct DeleteIntegrationSuccess {
    pub integration: IntegrationView,
}

#[derive(SimpleObject, Debug)]
pub struct ExportToIntegrationSuccess {
    pub integration: IntegrationView,
    /// Records accepted by the provider
    pub exported: u64,
}

#[derive(InputObject, Debug)]
pub struct SetIntegrationInput {
    /// Existing integration to update; omit to create one
    pub id: Option<ID>,
    /// READWISE, NOTION or POCKET
    pub name: String,
    /// API token, or the request code for Pocket. Required when creating;
    /// omit on update to keep the stored token.
    pub token: Option<String>,
    pub enabled: Option<bool>,
    pub settings: Option<Json<serde_json::Value>>,
}

#[derive(Default)]
pub struct IntegrationQuery;

#[Object]
impl IntegrationQuery {
    async fn integrations(&self, ctx: &Context<'_>) -> async_graphql::Result<IntegrationsResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            service::integrations(state.store(), uid).await
        }
        .await;

        respond(result, |integrations| {
            IntegrationsResult::IntegrationsSuccess(IntegrationsSuccess {
                integrations: integrations.into_iter().map(Into::into).collect(),
            })
        })
    }
}

#[derive(Default)]
pub struct IntegrationMutation;

#[Object]
impl IntegrationMutation {
    async fn set_integration(
        &self,
        ctx: &Context<'_>,
        input: SetIntegrationInput,
    ) -> async_graphql::Result<SetIntegrationResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let input = service::SetIntegrationInput {
                id: input
                    .id
                    .as_ref()
                    .map(|id| parse_id(id, "integration"))
                    .transpose()?,
                name: input.name,
                token: input.token,
                enabled: input.enabled,
                settings: input.settings.map(|Json(settings)| settings),
            };
            service::set_integration(state.store(), state.integrations(), uid, input).await
        }
        .await;

        respond(result, |integration| {
            SetIntegrationResult::SetIntegrationSuccess(SetIntegrationSuccess {
                integration: integration.into(),
            })
        })
    }

    async fn delete_integration(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<DeleteIntegrationResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let id = parse_id(&id, "integration")?;
            service::delete_integration(state.store(), uid, id).await
        }
        .await;

        respond(result, |integration| {
            DeleteIntegrationResult::DeleteIntegrationSuccess(DeleteIntegrationSuccess {
                integration: integration.into(),
            })
        })
    }

    /// Push items changed since the last export to the provider
    async fn export_to_integration(
        &self,
        ctx: &Context<'_>,
        integration_id: ID,
    ) -> async_graphql::Result<ExportToIntegrationResult> {
        let state = app_state(ctx)?;
        let result = async {
            let uid = authorized(ctx)?;
            let id = parse_id(&integration_id, "integration")?;
            service::export_to_integration(state.store(), state.integrations(), uid, id).await
        }
        .await;

        respond(result, |outcome| {
            ExportToIntegrationResult::ExportToIntegrationSuccess(ExportToIntegrationSuccess {
                integration: outcome.integration.into(),
                exported: outcome.exported as u64,
            })
        })
    }
}
