//! Output views for the eventhub endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::FieldError;

mod auth;
pub use auth::*;

mod event;
pub use event::*;

mod user;
pub use user::*;

/// An error response for an API endpoint. This is used to return errors to the
/// client in a consistent format.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// An error code that can be used to identify the type of error that
    /// occurred, e.g. `ValidationError` or `AlreadyJoined`.
    pub code: Option<String>,

    /// A human-readable message describing the error that occurred.
    pub message: String,

    /// Per-field detail for validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
