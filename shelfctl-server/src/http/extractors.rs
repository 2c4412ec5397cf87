//! Custom Axum extractors

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderValue;

use super::error::ApiError;
use super::server::HttpState;
use crate::graphql::Claims;
use crate::services::users::authenticate;

/// Caller identity from `Authorization: Bearer <api key>`.
///
/// A missing header or an unknown key yields `None`; resolvers then answer
/// `UNAUTHORIZED`. A header that is not a bearer credential is rejected.
pub struct MaybeClaims(pub Option<Claims>);

impl FromRequestParts<HttpState> for MaybeClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HttpState,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self(None));
        };

        let api_key = bearer_token(value)?;
        let uid = authenticate(state.app.store(), api_key).await?;
        if uid.is_none() {
            tracing::debug!("unknown api key");
        }
        Ok(Self(uid.map(|uid| Claims { uid })))
    }
}

fn bearer_token(value: &HeaderValue) -> Result<&str, ApiError> {
    // Scheme names are case-insensitive
    value
        .to_str()
        .ok()
        .and_then(|v| v.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::BadRequest {
            message: "authorization header must be 'Bearer <api key>'".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_token() {
        let value = HeaderValue::from_static("Bearer shelf_abc ");
        assert_eq!(bearer_token(&value).unwrap(), "shelf_abc");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        for header in ["bearer shelf_abc", "BEARER shelf_abc"] {
            let value = HeaderValue::from_static(header);
            assert_eq!(bearer_token(&value).unwrap(), "shelf_abc");
        }
    }

    #[test]
    fn rejects_missing_token() {
        let value = HeaderValue::from_static("Bearer ");
        assert!(bearer_token(&value).is_err());
    }

    #[test]
    fn rejects_other_schemes() {
        let value = HeaderValue::from_static("Basic dXNlcjpwYXNz");
        assert!(matches!(
            bearer_token(&value),
            Err(ApiError::BadRequest { .. })
        ));
    }
}
