//! Business logic between the handlers and the storage traits.
//!
//! Every service parses ids before touching storage, so a malformed id is
//! reported as [`ApiError::InvalidId`] without a round trip.

use eventhub_db::models::DbId;

use crate::error::ApiError;

mod credentials;
mod events;
mod participation;
mod users;

pub use credentials::CredentialService;
pub use events::EventDirectory;
pub use participation::Participation;
pub use users::UserDirectory;

pub(crate) fn parse_id(resource: &'static str, id: &str) -> Result<DbId, ApiError> {
    DbId::parse(id).ok_or_else(|| ApiError::invalid_id(resource, id))
}
