pub mod error;
pub mod extractor;
pub mod jwt;
pub mod manager;
pub mod provider;
pub mod providers;

pub use error::AuthError;
pub use extractor::Auth;
pub use jwt::{TokenClaims, TokenError, TokenIssuer};
pub use manager::AuthManager;
pub use provider::AuthProvider;
pub use providers::bearer::BearerAuthProvider;
