use std::sync::Arc;

use chrono::Duration;
use eventhub_db::storage::Storage;

use crate::{
    auth::{AuthManager, BearerAuthProvider, TokenIssuer},
    config::EventhubApiConfig,
    services::{CredentialService, EventDirectory, Participation, UserDirectory},
    upload::UploadStore,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<EventhubApiConfig>,
    pub db: Arc<dyn Storage>,
    pub auth_manager: Arc<AuthManager>,
    pub tokens: Arc<TokenIssuer>,
    pub uploads: UploadStore,
}

impl ApiContext {
    /// `jwt_secret` is the resolved signing secret; it is fixed for the
    /// lifetime of the process.
    pub fn new(config: EventhubApiConfig, db: Arc<dyn Storage>, jwt_secret: &str) -> Self {
        let tokens = Arc::new(TokenIssuer::new(
            jwt_secret.as_bytes(),
            Duration::hours(config.token_ttl_hours),
        ));
        let auth_manager =
            AuthManager::new().with_provider(BearerAuthProvider::new(tokens.clone()));
        let uploads = UploadStore::new(config.upload_dir.clone());

        Self {
            config: Arc::new(config),
            db,
            auth_manager: Arc::new(auth_manager),
            tokens,
            uploads,
        }
    }

    pub fn credentials(&self) -> CredentialService {
        CredentialService::new(self.db.clone(), self.tokens.clone(), self.config.bcrypt_cost)
    }

    pub fn users(&self) -> UserDirectory {
        UserDirectory::new(self.db.clone())
    }

    pub fn events(&self) -> EventDirectory {
        EventDirectory::new(self.db.clone())
    }

    pub fn participation(&self) -> Participation {
        Participation::new(self.db.clone())
    }
}
