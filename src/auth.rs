//! Caller identity, as established by the authentication layer in front of
//! this service.

use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header the upstream authentication layer sets to the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                tracing::debug!("Request without authenticated user identity");
                AppError::Unauthorized
            })?;

        Ok(AuthUser(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<AuthUser, AppError> {
        let mut builder = Request::builder().uri("/api/journal");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_the_trimmed_user_id() {
        assert_eq!(extract(Some(" user-1 ")).await.unwrap(), AuthUser("user-1".to_string()));
    }

    #[tokio::test]
    async fn missing_or_blank_identity_is_unauthorized() {
        assert!(matches!(extract(None).await, Err(AppError::Unauthorized)));
        assert!(matches!(extract(Some("   ")).await, Err(AppError::Unauthorized)));
    }
}
