use std::sync::Arc;

use anyhow::Context;
use eventhub_common::{params::NewUser, views::User};
use eventhub_db::{
    models::DbUser,
    password::{hash_password, verify_password},
    storage::{Storage, StoreError, UserFilter, UserStore},
};
use tracing::{info, instrument};

use crate::{auth::TokenIssuer, error::ApiError};

/// Registration and login. Owns everything that touches raw passwords.
#[derive(Clone)]
pub struct CredentialService {
    db: Arc<dyn Storage>,
    tokens: Arc<TokenIssuer>,
    bcrypt_cost: u32,
}

impl CredentialService {
    pub fn new(db: Arc<dyn Storage>, tokens: Arc<TokenIssuer>, bcrypt_cost: u32) -> Self {
        Self {
            db,
            tokens,
            bcrypt_cost,
        }
    }

    #[instrument(skip(self), fields(email = %new_user.email))]
    pub async fn register(
        &self,
        new_user: NewUser,
        image: Option<String>,
    ) -> Result<User, ApiError> {
        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(ApiError::DuplicateEmail {
                email: new_user.email,
            });
        }

        let NewUser {
            name,
            email,
            password,
            role,
        } = new_user;

        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .context("password hashing task failed")?
            .context("failed to hash password")?;

        let mut user = DbUser::new(name, email, password_hash, role);
        user.image = image;

        let user = UserStore::create(&*self.db, user)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration.
                StoreError::DuplicateKey(email) => ApiError::DuplicateEmail { email },
                other => other.into(),
            })?;

        info!(user_id = %user.id, role = %user.role, "Registered user");
        Ok(user.into())
    }

    /// Check `password` against the stored hash and issue a bearer token.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, User), ApiError> {
        let email = email.trim().to_lowercase();
        let user = self
            .find_by_email(&email)
            .await?
            .ok_or(ApiError::not_found("User"))?;

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .context("password verification task failed")?
            // A malformed stored hash can never match.
            .unwrap_or(false);

        if !matches {
            return Err(ApiError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&user.id.to_string(), user.role)
            .context("failed to issue token")?;

        info!(user_id = %user.id, "User logged in");
        Ok((token, user.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<DbUser>, ApiError> {
        let users = UserStore::list(
            &*self.db,
            UserFilter {
                email: Some(vec![email.to_string()]),
                ..Default::default()
            },
        )
        .await?;

        Ok(users.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use eventhub_common::{Role, params::RegisterUserParams};

    use super::*;
    use crate::services::test_support::storage;

    fn service() -> (CredentialService, Arc<TokenIssuer>) {
        let tokens = Arc::new(TokenIssuer::new(b"credentials-test", Duration::hours(5)));
        (CredentialService::new(storage(), tokens.clone(), 4), tokens)
    }

    fn new_user(email: &str, password: &str) -> NewUser {
        RegisterUserParams {
            name: Some("Ada".into()),
            email: Some(email.into()),
            password: Some(password.into()),
            role: Some("organizer".into()),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn register_then_login() {
        let (service, tokens) = service();

        let user = service
            .register(new_user("ada@example.com", "hunter22"), None)
            .await
            .unwrap();
        assert_eq!(user.role, Role::Organizer);
        assert!(user.registered_events.is_empty());

        let (token, logged_in) = service
            .authenticate("  ADA@example.com ", "hunter22")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.role, Role::Organizer);
    }

    #[tokio::test]
    async fn register_keeps_image_reference() {
        let (service, _) = service();

        let user = service
            .register(
                new_user("ada@example.com", "hunter22"),
                Some("/uploads/users/1-a.png".into()),
            )
            .await
            .unwrap();

        assert_eq!(user.image.as_deref(), Some("/uploads/users/1-a.png"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (service, _) = service();

        service
            .register(new_user("ada@example.com", "hunter22"), None)
            .await
            .unwrap();
        let err = service
            .register(new_user("ada@example.com", "other-password"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let (service, _) = service();
        service
            .register(new_user("ada@example.com", "hunter22"), None)
            .await
            .unwrap();

        let err = service
            .authenticate("ada@example.com", "hunter23")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let (service, _) = service();

        let err = service
            .authenticate("nobody@example.com", "whatever")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { resource: "User" }));
    }
}
