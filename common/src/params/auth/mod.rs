use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Deserialize, Serialize, ToSchema)]
pub struct AuthLoginParams {
    /// The email address of the user to authenticate as.
    pub email: String,

    /// The password of the user to authenticate as.
    pub password: String,
}

impl fmt::Debug for AuthLoginParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthLoginParams")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
