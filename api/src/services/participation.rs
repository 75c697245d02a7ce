use std::sync::Arc;

use eventhub_common::views::JoinResult;
use eventhub_db::storage::{AddParticipant, EventStore, Storage, UserStore};
use tracing::{info, instrument};

use super::parse_id;
use crate::error::ApiError;

pub const JOIN_SUCCESS_MESSAGE: &str = "User successfully joined the event";

/// The join-event workflow. A user moves from not joined to joined exactly
/// once per event; there is no way back.
#[derive(Clone)]
pub struct Participation {
    db: Arc<dyn Storage>,
}

impl Participation {
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    /// Add `user_id` to the participants of `event_id`.
    ///
    /// The membership check and the insert are one conditional store
    /// update, so concurrent joins by the same user produce exactly one
    /// success.
    #[instrument(skip(self))]
    pub async fn join(&self, event_id: &str, user_id: &str) -> Result<JoinResult, ApiError> {
        let event = parse_id("event", event_id)?;
        let user = parse_id("user", user_id)?;

        match EventStore::add_participant(&*self.db, &event, &user).await? {
            AddParticipant::Added(_) => {
                UserStore::add_registered_event(&*self.db, &user, &event).await?;
                info!(%event, %user, "User joined event");

                Ok(JoinResult {
                    success: true,
                    message: JOIN_SUCCESS_MESSAGE.to_string(),
                    event_id: event.to_string(),
                })
            }
            AddParticipant::AlreadyPresent => Err(ApiError::AlreadyJoined {
                event_id: event.to_string(),
                user_id: user.to_string(),
            }),
            AddParticipant::EventMissing => Err(ApiError::not_found("Event")),
        }
    }
}
