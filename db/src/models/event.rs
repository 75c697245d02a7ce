use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use eventhub_common::views::{Event, OrganizerSummary};
use serde::{Deserialize, Serialize};

use crate::models::{DbId, DbUser};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbEvent {
    #[serde(rename = "_id")]
    pub id: DbId,

    pub title: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,

    pub location: String,

    /// The user that created this event
    pub organizer: DbId,

    /// Users that joined this event. Maintained with `$addToSet`, so an id
    /// appears at most once.
    #[serde(default)]
    pub participants: Vec<DbId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl DbEvent {
    pub fn new(title: String, date: DateTime<Utc>, location: String, organizer: DbId) -> Self {
        let now = Utc::now();
        Self {
            id: DbId::new(),
            title,
            date,
            location,
            organizer,
            participants: Vec::new(),
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the client view, joining in the organizer's public fields.
    /// `organizer` should be the user whose id matches `self.organizer`;
    /// pass `None` when that user no longer exists.
    pub fn into_view(self, organizer: Option<&DbUser>) -> Event {
        Event {
            id: self.id.to_string(),
            title: self.title,
            date: self.date,
            location: self.location,
            organizer: organizer.map(|user| OrganizerSummary {
                id: user.id.to_string(),
                name: user.name.clone(),
                email: user.email.clone(),
            }),
            participants: self.participants.iter().map(ToString::to_string).collect(),
            image: self.image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
