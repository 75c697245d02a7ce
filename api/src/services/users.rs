use std::sync::Arc;

use eventhub_common::{params::UserPatch, views::User};
use eventhub_db::storage::{Storage, StoreError, UserFilter, UserStore, UserUpdate};
use tracing::{info, instrument};

use super::parse_id;
use crate::error::ApiError;

/// Read, update and delete access to user records.
#[derive(Clone)]
pub struct UserDirectory {
    db: Arc<dyn Storage>,
}

impl UserDirectory {
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<User, ApiError> {
        let id = parse_id("user", id)?;

        UserStore::get(&*self.db, &id)
            .await?
            .map(Into::into)
            .ok_or(ApiError::not_found("User"))
    }

    /// Every user. Unpaginated.
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        let users = UserStore::list(&*self.db, UserFilter::default()).await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, patch, image))]
    pub async fn update(
        &self,
        id: &str,
        patch: UserPatch,
        image: Option<String>,
    ) -> Result<User, ApiError> {
        let id = parse_id("user", id)?;

        if let Some(email) = &patch.email {
            let owners = UserStore::list(
                &*self.db,
                UserFilter {
                    email: Some(vec![email.clone()]),
                    ..Default::default()
                },
            )
            .await?;

            if owners.iter().any(|owner| owner.id != id) {
                return Err(ApiError::DuplicateEmail {
                    email: email.clone(),
                });
            }
        }

        let update = UserUpdate {
            name: patch.name,
            email: patch.email,
            role: patch.role,
            image,
        };

        let user = UserStore::update(&*self.db, &id, update)
            .await
            .map_err(|e| match e {
                StoreError::DuplicateKey(email) => ApiError::DuplicateEmail { email },
                other => other.into(),
            })?
            .ok_or(ApiError::not_found("User"))?;

        info!(user_id = %user.id, "Updated user");
        Ok(user.into())
    }

    /// Remove a user. Their events and participations are left in place.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<User, ApiError> {
        let id = parse_id("user", id)?;

        let user = UserStore::delete(&*self.db, &id)
            .await?
            .ok_or(ApiError::not_found("User"))?;

        info!(user_id = %user.id, "Deleted user");
        Ok(user.into())
    }
}
