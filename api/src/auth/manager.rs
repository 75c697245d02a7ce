use axum::http::request::Parts;
use eventhub_common::caller::Caller;
use tracing::{debug, instrument, trace};

use super::{error::AuthError, provider::AuthProvider};

/// The access gate: asks each registered provider, in registration order,
/// to turn request credentials into a [`Caller`].
///
/// A provider answering `MissingCredentials` passes the request on to the
/// next one. Any other error stops the search, so a bad bearer token is
/// reported as such instead of falling through to "no credentials".
///
/// ```rust,ignore
/// let auth_manager = AuthManager::new()
///     .with_provider(BearerAuthProvider::new(tokens.clone()));
///
/// let caller = auth_manager.authenticate(&request_parts).await?;
/// ```
pub struct AuthManager {
    providers: Vec<Box<dyn AuthProvider>>,
}

impl AuthManager {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn with_provider<P: AuthProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    #[instrument(skip_all, fields(method = %parts.method, path = %parts.uri.path()))]
    pub async fn authenticate(&self, parts: &Parts) -> Result<Caller, AuthError> {
        for provider in &self.providers {
            match provider.authenticate(parts).await {
                Ok(caller) => {
                    debug!(scheme = provider.scheme(), "Auth succeeded");
                    return Ok(caller);
                }
                Err(AuthError::MissingCredentials) => {
                    trace!(scheme = provider.scheme(), "No credentials for this scheme");
                }
                Err(e) => {
                    debug!(scheme = provider.scheme(), error = %e, "Auth failed");
                    return Err(e);
                }
            }
        }

        Err(AuthError::MissingCredentials)
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}
