//! Bearer token authentication provider.
//!
//! Reads `Authorization: Bearer <token>`, verifies the token with the
//! [`TokenIssuer`] and turns its claims into a [`Caller`]. Nothing is looked
//! up in storage; the token alone asserts the user's id and role.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, header, request::Parts};
use eventhub_common::caller::Caller;
use tracing::{debug, instrument};

use crate::auth::{error::AuthError, jwt::TokenIssuer, provider::AuthProvider};

const BEARER_PREFIX: &str = "Bearer ";

pub struct BearerAuthProvider {
    tokens: Arc<TokenIssuer>,
}

impl BearerAuthProvider {
    pub fn new(tokens: Arc<TokenIssuer>) -> Self {
        Self { tokens }
    }

    /// Extract the token from the Authorization header.
    fn extract_token(headers: &HeaderMap) -> Option<&str> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = value
            .get(..BEARER_PREFIX.len())
            .filter(|scheme| scheme.eq_ignore_ascii_case(BEARER_PREFIX))
            .map(|_| value[BEARER_PREFIX.len()..].trim())?;

        (!token.is_empty()).then_some(token)
    }
}

#[async_trait]
impl AuthProvider for BearerAuthProvider {
    #[instrument(skip(self, parts), fields(scheme = "bearer"))]
    async fn authenticate(&self, parts: &Parts) -> Result<Caller, AuthError> {
        let token =
            Self::extract_token(&parts.headers).ok_or(AuthError::MissingCredentials)?;

        let claims = self.tokens.verify(token)?;
        debug!(user_id = %claims.id, role = %claims.role, "Bearer token verified");

        Ok(Caller::new(claims.id, claims.role))
    }

    fn scheme(&self) -> &'static str {
        "bearer"
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use chrono::Duration;
    use eventhub_common::Role;

    use super::*;

    fn provider() -> (BearerAuthProvider, Arc<TokenIssuer>) {
        let tokens = Arc::new(TokenIssuer::new(b"bearer-test-secret", Duration::hours(5)));
        (BearerAuthProvider::new(tokens.clone()), tokens)
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/event/create");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_extract_token_basic() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());

        assert_eq!(
            BearerAuthProvider::extract_token(&headers),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn test_extract_token_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "bearer abc".parse().unwrap());

        assert_eq!(BearerAuthProvider::extract_token(&headers), Some("abc"));
    }

    #[test]
    fn test_extract_token_missing_or_empty() {
        assert_eq!(BearerAuthProvider::extract_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(BearerAuthProvider::extract_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwdw==".parse().unwrap());
        assert_eq!(BearerAuthProvider::extract_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bear".parse().unwrap());
        assert_eq!(BearerAuthProvider::extract_token(&headers), None);
    }

    #[tokio::test]
    async fn test_valid_token_yields_caller() {
        let (provider, tokens) = provider();
        let token = tokens.issue("65f1c0ffee0000000000beef", Role::Organizer).unwrap();

        let caller = provider
            .authenticate(&parts_with_auth(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(caller, Caller::new("65f1c0ffee0000000000beef", Role::Organizer));
    }

    #[tokio::test]
    async fn test_missing_header_is_missing_credentials() {
        let (provider, _) = provider();
        let result = provider.authenticate(&parts_with_auth(None)).await;

        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_bad_token_is_invalid_credentials() {
        let (provider, _) = provider();
        let result = provider
            .authenticate(&parts_with_auth(Some("Bearer not-a-jwt")))
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }
}
