use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The organizer of an event, resolved from the user record at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrganizerSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,

    /// `null` when the organizing user no longer exists.
    pub organizer: Option<OrganizerSummary>,

    /// Ids of the users that joined, in join order. Never contains
    /// duplicates.
    pub participants: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEventResponse {
    pub message: String,
    pub event: Event,
}

/// Outcome of a successful join.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinResult {
    pub success: bool,
    pub message: String,
    pub event_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JoinEventResponse {
    pub success: bool,
    pub data: JoinResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventResponse {
    pub success: bool,
    pub message: String,
    pub data: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventResponse {
    pub message: String,
    pub deleted_event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub deleted_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteAllEventsResponse {
    pub success: bool,
    pub message: String,
    pub data: DeleteSummary,
}
