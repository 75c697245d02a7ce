use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::validation::{ValidationErrors, optional_non_blank, required};

/// Form fields accepted by the event creation endpoint. Sent as
/// `multipart/form-data` alongside an optional `image` file. The organizer
/// is always the authenticated caller and cannot be supplied here.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateEventParams {
    pub title: Option<String>,

    /// RFC 3339 timestamp, `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD` (UTC).
    pub date: Option<String>,

    pub location: Option<String>,
}

/// An event creation that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,
}

impl CreateEventParams {
    pub fn validate(&self) -> Result<NewEvent, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = required(&mut errors, "title", self.title.as_deref());
        let date = required(&mut errors, "date", self.date.as_deref())
            .and_then(|date| check_date(&mut errors, &date));
        let location = required(&mut errors, "location", self.location.as_deref());

        match (title, date, location) {
            (Some(title), Some(date), Some(location)) => Ok(NewEvent {
                title,
                date,
                location,
            }),
            _ => Err(errors),
        }
    }
}

/// Form fields accepted by the event update endpoint. Absent fields are
/// left untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateEventParams {
    pub title: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
}

/// A validated partial event update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl UpdateEventParams {
    pub fn validate(&self) -> Result<EventPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = optional_non_blank(&mut errors, "title", self.title.as_deref());
        let date = optional_non_blank(&mut errors, "date", self.date.as_deref())
            .and_then(|date| check_date(&mut errors, &date));
        let location = optional_non_blank(&mut errors, "location", self.location.as_deref());

        errors.finish(EventPatch {
            title,
            date,
            location,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinEventParams {
    /// The event to join.
    pub event_id: Option<String>,
}

impl JoinEventParams {
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let event_id = required(&mut errors, "eventId", self.event_id.as_deref());
        match event_id {
            Some(id) => Ok(id),
            None => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchEventsParams {
    /// Case-insensitive substring to look for in event titles.
    pub name: Option<String>,
}

impl SearchEventsParams {
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match required(&mut errors, "name", self.name.as_deref()) {
            Some(name) => Ok(name),
            None => Err(errors),
        }
    }
}

/// Parses the date formats browsers and the original clients send.
pub fn parse_event_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn check_date(errors: &mut ValidationErrors, date: &str) -> Option<DateTime<Utc>> {
    let parsed = parse_event_date(date);
    if parsed.is_none() {
        errors.add("date", "date must be an ISO 8601 date or timestamp");
    }
    parsed
}
