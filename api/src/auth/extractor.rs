use std::future::Future;
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use eventhub_common::caller::{Caller, CallerError};

use crate::{auth::AuthError, context::ApiContext, error::ApiError};

/// Extractor that REQUIRES authentication.
///
/// A request without a bearer token is rejected with 401 Unauthorized; a
/// token that fails verification (bad signature, malformed, expired) is
/// rejected with 403 Forbidden.
///
/// # Examples
///
/// ```rust,ignore
/// use eventhub_api::auth::extractor::Auth;
///
/// pub async fn join_event(
///     State(ctx): State<ApiContext>,
///     Auth(caller): Auth,  // ← extracts authenticated caller
///     Json(body): Json<JoinEventParams>,
/// ) -> Result<Json<JoinEventResponse>, ApiError> {
///     let user_id = caller.id.as_str();
///     // ... join the event as `user_id`
/// }
/// ```
pub struct Auth(pub Caller);

impl FromRequestParts<ApiContext> for Auth {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &ApiContext,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let auth_manager = Arc::clone(&state.auth_manager);
        async move {
            let caller = auth_manager.authenticate(parts).await.map_err(|e| match e {
                AuthError::MissingCredentials => {
                    ApiError::CallerError(CallerError::unauthorized(Some(e.to_string())))
                }
                other => ApiError::CallerError(CallerError::forbidden(other.to_string())),
            })?;
            Ok(Auth(caller))
        }
    }
}
