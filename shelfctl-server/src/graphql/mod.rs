//! GraphQL schema.
//!
//! Every operation returns a union of a success object and an error object
//! carrying `errorCodes`. Failures without a code (storage, bugs) are logged
//! and surface as a plain top-level GraphQL error.

use async_graphql::{Context, EmptySubscription, MergedObject, Schema, ID};
use uuid::Uuid;

use crate::error::{ErrorCode, ServiceError, ServiceResult};
use crate::state::AppState;

/// Declares `$result = $success | $error`, the error object, and its code
/// enum. Codes not listed classify as `UNKNOWN`.
macro_rules! op_result {
    ($result:ident, $success:ident, $error:ident, $code:ident { $($variant:ident),+ $(,)? }) => {
        #[derive(async_graphql::Enum, Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $code {
            $($variant,)+
            Unknown,
        }

        impl From<$crate::error::ErrorCode> for $code {
            fn from(code: $crate::error::ErrorCode) -> Self {
                match code {
                    $($crate::error::ErrorCode::$variant => Self::$variant,)+
                    #[allow(unreachable_patterns)]
                    _ => Self::Unknown,
                }
            }
        }

        #[derive(async_graphql::SimpleObject, Debug)]
        pub struct $error {
            pub error_codes: Vec<$code>,
        }

        #[derive(async_graphql::Union)]
        pub enum $result {
            $success($success),
            $error($error),
        }

        impl $crate::graphql::OpResult for $result {
            type Code = $code;

            fn failure(codes: Vec<$code>) -> Self {
                Self::$error($error { error_codes: codes })
            }
        }
    };
}

pub mod highlights;
pub mod integrations;
pub mod labels;
pub mod library_items;
pub mod types;

pub type ShelfSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    labels::LabelQuery,
    library_items::LibraryItemQuery,
    integrations::IntegrationQuery,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    labels::LabelMutation,
    library_items::LibraryItemMutation,
    highlights::HighlightMutation,
    integrations::IntegrationMutation,
);

/// Identity of the caller, attached to the request by the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    pub uid: Uuid,
}

pub fn build_schema(state: AppState) -> ShelfSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(state)
    .finish()
}

/// A success/error union that can be built from error codes.
pub trait OpResult: Sized {
    type Code: From<ErrorCode>;

    fn failure(codes: Vec<Self::Code>) -> Self;
}

/// Fold a service result into the operation's union.
pub(crate) fn respond<T, R: OpResult>(
    result: ServiceResult<T>,
    success: impl FnOnce(T) -> R,
) -> async_graphql::Result<R> {
    match result {
        Ok(value) => Ok(success(value)),
        Err(err) => match err.code() {
            Some(code) => {
                tracing::debug!(error = %err, ?code, "operation rejected");
                Ok(R::failure(vec![code.into()]))
            }
            None => {
                tracing::error!(error = %err, "operation failed");
                Err(async_graphql::Error::new("internal server error"))
            }
        },
    }
}

pub(crate) fn authorized(ctx: &Context<'_>) -> ServiceResult<Uuid> {
    ctx.data_opt::<Claims>()
        .map(|claims| claims.uid)
        .ok_or(ServiceError::Unauthorized)
}

pub(crate) fn app_state<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a AppState> {
    ctx.data::<AppState>()
}

/// Ids that are not UUIDs cannot exist.
pub(crate) fn parse_id(id: &ID, resource: &'static str) -> ServiceResult<Uuid> {
    Uuid::parse_str(id.as_str()).map_err(|_| ServiceError::not_found(resource, id.as_str()))
}

pub(crate) fn parse_ids(ids: &[ID], resource: &'static str) -> ServiceResult<Vec<Uuid>> {
    ids.iter().map(|id| parse_id(id, resource)).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_fall_back() {
        use labels::{CreateLabelErrorCode, CreateLabelResult};

        assert_eq!(
            CreateLabelErrorCode::from(ErrorCode::LabelAlreadyExists),
            CreateLabelErrorCode::LabelAlreadyExists
        );
        assert_eq!(
            CreateLabelErrorCode::from(ErrorCode::InvalidToken),
            CreateLabelErrorCode::Unknown
        );

        match CreateLabelResult::failure(vec![CreateLabelErrorCode::BadRequest]) {
            CreateLabelResult::CreateLabelError(e) => {
                assert_eq!(e.error_codes, vec![CreateLabelErrorCode::BadRequest])
            }
            CreateLabelResult::CreateLabelSuccess(_) => panic!("expected error"),
        }
    }

    #[test]
    fn invalid_id_is_not_found() {
        let err = parse_id(&ID::from("nope"), "label").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));

        let id = Uuid::new_v4();
        assert_eq!(parse_id(&ID::from(id.to_string()), "label").unwrap(), id);
    }

    #[test]
    fn schema_builds() {
        let schema = Schema::build(
            QueryRoot::default(),
            MutationRoot::default(),
            EmptySubscription,
        )
        .finish();
        let sdl = schema.sdl();
        assert!(sdl.contains("union CreateLabelResult"));
        assert!(sdl.contains("LABEL_ALREADY_EXISTS"));
    }
}
