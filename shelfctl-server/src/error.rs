//! Service errors and the API error codes they classify into

use crate::db::StoreError;
use crate::integrations::IntegrationError;
use crate::models::{IntegrationKind, ValidationError};

/// Every code an operation can report in its error union.
/// Each GraphQL error-code enum converts from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Unauthorized,
    BadRequest,
    NotFound,
    LabelAlreadyExists,
    AlreadyExists,
    InvalidToken,
    RequestFailed,
    Unknown,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthorized,

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("label '{name}' already exists")]
    LabelAlreadyExists { name: String },

    #[error("{resource} already exists")]
    AlreadyExists { resource: &'static str },

    #[error("{integration} rejected the token")]
    InvalidToken { integration: IntegrationKind },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Integration(#[from] IntegrationError),

    #[error(transparent)]
    Store(StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// The code reported to API callers, or `None` for internal failures
    /// that should surface as a generic error.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Unauthorized => Some(ErrorCode::Unauthorized),
            Self::NotFound { .. } => Some(ErrorCode::NotFound),
            Self::LabelAlreadyExists { .. } => Some(ErrorCode::LabelAlreadyExists),
            Self::AlreadyExists { .. } => Some(ErrorCode::AlreadyExists),
            Self::InvalidToken { .. } => Some(ErrorCode::InvalidToken),
            Self::BadRequest(_) | Self::Validation(_) => Some(ErrorCode::BadRequest),
            Self::Integration(e) if e.is_caller_error() => Some(ErrorCode::BadRequest),
            Self::Integration(_) => Some(ErrorCode::RequestFailed),
            Self::Store(_) => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { resource, id } => Self::NotFound { resource, id },
            StoreError::Conflict { resource, .. } => Self::AlreadyExists { resource },
            other => Self::Store(other),
        }
    }
}
