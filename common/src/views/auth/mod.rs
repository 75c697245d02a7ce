use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::User;

/// Response for the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthLoginResponse {
    pub message: String,

    /// Bearer token to send as `Authorization: Bearer <token>` on
    /// authenticated requests. Valid for five hours by default.
    pub token: String,

    /// The authenticated user.
    pub user: User,
}
