use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use eventhub_common::{Role, views::User};
use serde::{Deserialize, Serialize};

use crate::models::DbId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbUser {
    #[serde(rename = "_id")]
    pub id: DbId,
    pub name: String,
    pub email: String,

    /// bcrypt hash of the user's password
    pub password_hash: String,

    #[serde(default)]
    pub role: Role,

    /// Events joined by this user, in join order
    #[serde(default)]
    pub registered_events: Vec<DbId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl DbUser {
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        Self {
            id: DbId::new(),
            name,
            email,
            password_hash,
            role,
            registered_events: Vec::new(),
            image: None,
            created_at: Utc::now(),
        }
    }
}

impl From<DbUser> for User {
    fn from(value: DbUser) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            email: value.email,
            role: value.role,
            registered_events: value
                .registered_events
                .iter()
                .map(ToString::to_string)
                .collect(),
            image: value.image,
            created_at: value.created_at,
        }
    }
}
