use thiserror::Error;

use super::jwt::TokenError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Credentials expired")]
    Expired,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::Expired,
            other => AuthError::InvalidCredentials(other.to_string()),
        }
    }
}
